// Copyright (c) 2025 - Cowboy AI, Inc.

//! Aggregation Engine - Projection F: DataUnionEvents → EntityStore
//!
//! Consumes one decoded event at a time and applies it to the store:
//!
//! ```text
//! DataUnionEvent
//!      │
//!      ├─ read_keys()   which union / member / bucket keys the event needs
//!      ├─ load          ReadSet from the EntityStore
//!      ├─ plan()        pure: WriteBatch + anomalies
//!      └─ execute()     one commit per event
//! ```
//!
//! # Handlers
//!
//! | Event             | Member write        | Delta (members, revenue) | Extra              |
//! |-------------------|---------------------|--------------------------|--------------------|
//! | `MemberJoined`    | upsert ACTIVE       | (+1, 0)                  |                    |
//! | `MemberParted`    | set INACTIVE        | (-1, 0)                  | fatal if no member |
//! | `RevenueReceived` |                     | (0, amount)              | RevenueEvent       |
//! | `DataUnionCreated`|                     |                          | creates the union  |
//!
//! Every delta updates the union totals, the HOUR bucket and the DAY bucket
//! together, in one batch.
//!
//! # Sequential Contract
//!
//! The engine is driven by a single caller, one event at a time, in block
//! order. It holds no locks and no cache; everything it knows is read from
//! the store per event.
//!
//! # Errors
//!
//! - Missing data union: recovered, reported in [`ProjectionOutcome::anomalies`]
//! - Missing member on part: [`StatsError::MemberNotFound`], nothing written
//! - Store failure: returned as is, nothing further attempted for the event

pub mod executor;
pub mod pure;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::StatsConfig;
use crate::domain::{Address, Bucket, BucketKind, UnionTotals};
use crate::errors::{StatsError, StatsResult};
use crate::events::{DataUnionCreated, DataUnionEvent, MemberJoined, MemberParted, RevenueReceived};
use crate::resolver;
use crate::store::EntityStore;

pub use pure::{Anomaly, Plan, ReadKeys, ReadSet};

/// Projection Adapter trait
///
/// Anything that consumes an ordered event stream into a read model.
#[async_trait]
pub trait ProjectionAdapter: Send + Sync {
    /// The event type this projection handles
    type Event: Send + Sync;

    /// Result of projecting one event
    type Outcome: Send;

    /// Error type for projection operations
    type Error: std::error::Error + Send + Sync;

    /// Project one event into the target store
    async fn project(&mut self, event: Self::Event) -> Result<Self::Outcome, Self::Error>;

    /// Prepare the projection target; safe to call more than once
    async fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Verify the projection target is reachable
    async fn health_check(&self) -> Result<(), Self::Error>;

    fn name(&self) -> &str;
}

/// What applying one event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionOutcome {
    pub event_type: &'static str,
    pub union: Address,
    /// Number of records written
    pub writes: usize,
    pub anomalies: Vec<Anomaly>,
}

impl ProjectionOutcome {
    /// No anomaly was recovered from
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }
}

/// Summary of a replayed event sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub applied: usize,
    pub anomalies: Vec<Anomaly>,
}

/// The aggregation engine over an [`EntityStore`]
pub struct StatsProjection<S: EntityStore + ?Sized> {
    store: Arc<S>,
    config: StatsConfig,
}

impl<S: EntityStore + ?Sized> StatsProjection<S> {
    pub fn new(store: Arc<S>, config: StatsConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Apply one event: load, plan, commit
    pub async fn apply(&self, event: &DataUnionEvent) -> StatsResult<ProjectionOutcome> {
        let union = event.union_address();
        debug!(
            union = %union,
            event_type = event.event_type(),
            timestamp = event.block_timestamp(),
            "Applying event"
        );

        let reads = self.load(&pure::read_keys(event, &self.config)).await?;
        let plan = pure::plan(event, &reads, &self.config)?;

        executor::execute(self.store.as_ref(), event.event_type(), union, plan).await
    }

    pub async fn handle_data_union_created(&self, event: &DataUnionCreated) -> StatsResult<ProjectionOutcome> {
        self.apply(&DataUnionEvent::DataUnionCreated(event.clone())).await
    }

    pub async fn handle_member_joined(&self, event: &MemberJoined) -> StatsResult<ProjectionOutcome> {
        self.apply(&DataUnionEvent::MemberJoined(event.clone())).await
    }

    pub async fn handle_member_parted(&self, event: &MemberParted) -> StatsResult<ProjectionOutcome> {
        self.apply(&DataUnionEvent::MemberParted(event.clone())).await
    }

    pub async fn handle_revenue_received(&self, event: &RevenueReceived) -> StatsResult<ProjectionOutcome> {
        self.apply(&DataUnionEvent::RevenueReceived(event.clone())).await
    }

    /// Apply events in order, stopping at the first error
    ///
    /// Events before the failing one stay committed.
    pub async fn replay<I>(&self, events: I) -> StatsResult<ReplayReport>
    where
        I: IntoIterator<Item = DataUnionEvent>,
    {
        let mut report = ReplayReport::default();
        for event in events {
            let outcome = self.apply(&event).await?;
            report.applied += 1;
            report.anomalies.extend(outcome.anomalies);
        }
        Ok(report)
    }

    /// Load the bucket for `(kind, timestamp)`, creating and saving it when
    /// absent with the union's current totals as baseline
    pub async fn get_or_create_bucket(
        &self,
        kind: BucketKind,
        timestamp: u64,
        union: &Address,
    ) -> StatsResult<Bucket> {
        let window = resolver::resolve(kind, timestamp, self.config.bucket_scope, union);
        if let Some(existing) = self.store.load_bucket(&window.key).await? {
            return Ok(existing);
        }

        let baseline = match self.store.load_union(union).await? {
            Some(existing) => existing.totals(),
            None => {
                error!(union = %union, bucket = %window.key, "Data union was not found, using zero baseline");
                UnionTotals::default()
            }
        };

        let bucket = pure::materialize_bucket(None, &window, union, &baseline);
        self.store.save_bucket(bucket.clone()).await?;
        Ok(bucket)
    }

    async fn load(&self, keys: &ReadKeys) -> StatsResult<ReadSet> {
        let mut reads = ReadSet {
            union: self.store.load_union(&keys.union).await?,
            ..Default::default()
        };

        if let Some(member_id) = &keys.member {
            reads.member = self.store.load_member(member_id).await?;
        }

        for window in &keys.buckets {
            if let Some(bucket) = self.store.load_bucket(&window.key).await? {
                reads.buckets.insert(window.key.clone(), bucket);
            }
        }

        Ok(reads)
    }
}

#[async_trait]
impl<S: EntityStore + ?Sized> ProjectionAdapter for StatsProjection<S> {
    type Event = DataUnionEvent;
    type Outcome = ProjectionOutcome;
    type Error = StatsError;

    async fn project(&mut self, event: Self::Event) -> Result<Self::Outcome, Self::Error> {
        self.apply(&event).await
    }

    async fn initialize(&mut self) -> Result<(), Self::Error> {
        self.store.health_check().await
    }

    async fn health_check(&self) -> Result<(), Self::Error> {
        self.store.health_check().await
    }

    fn name(&self) -> &str {
        "dataunion-stats"
    }
}
