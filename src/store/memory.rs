// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory entity store
//!
//! All four tables sit behind one lock, so a batch commit is atomic with
//! respect to every reader.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use super::{EntityStore, Record, WriteBatch};
use crate::domain::{Address, Bucket, BucketKind, DataUnion, Member, RevenueEvent};
use crate::errors::StatsResult;

#[derive(Debug, Default)]
struct Tables {
    unions: HashMap<Address, DataUnion>,
    members: HashMap<String, Member>,
    buckets: BTreeMap<String, Bucket>,
    revenue_events: BTreeMap<String, RevenueEvent>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets of one kind ordered by start date
    pub async fn buckets_for(&self, kind: BucketKind) -> Vec<Bucket> {
        let tables = self.tables.read().await;
        let mut buckets: Vec<Bucket> = tables
            .buckets
            .values()
            .filter(|b| b.kind == kind)
            .cloned()
            .collect();
        buckets.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));
        buckets
    }

    /// Revenue audit log of one union ordered by date
    pub async fn revenue_events_for(&self, union: &Address) -> Vec<RevenueEvent> {
        let tables = self.tables.read().await;
        let mut events: Vec<RevenueEvent> = tables
            .revenue_events
            .values()
            .filter(|e| &e.data_union == union)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        events
    }

    pub async fn members_for(&self, union: &Address) -> Vec<Member> {
        let tables = self.tables.read().await;
        let mut members: Vec<Member> = tables
            .members
            .values()
            .filter(|m| &m.data_union == union)
            .cloned()
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        members
    }

    pub async fn record_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.unions.len() + tables.members.len() + tables.buckets.len() + tables.revenue_events.len()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load_union(&self, id: &Address) -> StatsResult<Option<DataUnion>> {
        Ok(self.tables.read().await.unions.get(id).cloned())
    }

    async fn load_member(&self, id: &str) -> StatsResult<Option<Member>> {
        Ok(self.tables.read().await.members.get(id).cloned())
    }

    async fn load_bucket(&self, id: &str) -> StatsResult<Option<Bucket>> {
        Ok(self.tables.read().await.buckets.get(id).cloned())
    }

    async fn load_revenue_event(&self, id: &str) -> StatsResult<Option<RevenueEvent>> {
        Ok(self.tables.read().await.revenue_events.get(id).cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> StatsResult<()> {
        let mut tables = self.tables.write().await;
        let writes = batch.len();

        for record in batch {
            match record {
                Record::DataUnion(r) => {
                    tables.unions.insert(r.id.clone(), r);
                }
                Record::Member(r) => {
                    tables.members.insert(r.id.clone(), r);
                }
                Record::Bucket(r) => {
                    tables.buckets.insert(r.id.clone(), r);
                }
                Record::RevenueEvent(r) => {
                    tables.revenue_events.insert(r.id.clone(), r);
                }
            }
        }

        debug!(writes, "Committed batch to memory store");
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
