// Copyright (c) 2025 - Cowboy AI, Inc.
//! Entity Store Abstraction
//!
//! Keyed storage for the four record kinds written by the projection.
//!
//! # Access Contract
//!
//! 1. **Load**: returns the latest committed record for a key, or `None`
//! 2. **Upsert**: writing an existing key replaces the record
//! 3. **Read-your-writes**: once `commit` returns, every later load of a
//!    written key observes the new value
//! 4. **Batch commit**: one event's writes arrive as a single [`WriteBatch`];
//!    stores that can commit it atomically must do so
//!
//! ```text
//! Event → load ReadSet → plan (pure) → WriteBatch → commit
//! ```

use async_trait::async_trait;

use crate::domain::{Address, Bucket, DataUnion, Member, RevenueEvent};
use crate::errors::StatsResult;

pub mod kv;
pub mod memory;

pub use kv::KvEntityStore;
pub use memory::MemoryStore;

/// Kinds of persisted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    DataUnion,
    Member,
    Bucket,
    RevenueEvent,
}

impl RecordKind {
    /// Key namespace used by stores with a flat key space
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::DataUnion => "union",
            RecordKind::Member => "member",
            RecordKind::Bucket => "bucket",
            RecordKind::RevenueEvent => "revenue",
        }
    }
}

/// A full record to upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    DataUnion(DataUnion),
    Member(Member),
    Bucket(Bucket),
    RevenueEvent(RevenueEvent),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::DataUnion(_) => RecordKind::DataUnion,
            Record::Member(_) => RecordKind::Member,
            Record::Bucket(_) => RecordKind::Bucket,
            Record::RevenueEvent(_) => RecordKind::RevenueEvent,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::DataUnion(r) => r.id.as_str(),
            Record::Member(r) => &r.id,
            Record::Bucket(r) => &r.id,
            Record::RevenueEvent(r) => &r.id,
        }
    }
}

/// Ordered upserts produced by one event
///
/// Later writes to the same key supersede earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<Record>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(record: Record) -> Self {
        Self {
            writes: vec![record],
        }
    }

    pub fn push(&mut self, record: Record) {
        self.writes.push(record);
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.writes.iter()
    }
}

impl IntoIterator for WriteBatch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

impl FromIterator<Record> for WriteBatch {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            writes: iter.into_iter().collect(),
        }
    }
}

/// Entity Store trait
///
/// Load by key per record kind, upsert through [`commit`](Self::commit).
/// The single-record `save_*` helpers are one-element batches.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load_union(&self, id: &Address) -> StatsResult<Option<DataUnion>>;

    async fn load_member(&self, id: &str) -> StatsResult<Option<Member>>;

    async fn load_bucket(&self, id: &str) -> StatsResult<Option<Bucket>>;

    async fn load_revenue_event(&self, id: &str) -> StatsResult<Option<RevenueEvent>>;

    /// Apply every write in the batch, in order
    async fn commit(&self, batch: WriteBatch) -> StatsResult<()>;

    async fn save_union(&self, union: DataUnion) -> StatsResult<()> {
        self.commit(WriteBatch::single(Record::DataUnion(union))).await
    }

    async fn save_member(&self, member: Member) -> StatsResult<()> {
        self.commit(WriteBatch::single(Record::Member(member))).await
    }

    async fn save_bucket(&self, bucket: Bucket) -> StatsResult<()> {
        self.commit(WriteBatch::single(Record::Bucket(bucket))).await
    }

    async fn save_revenue_event(&self, event: RevenueEvent) -> StatsResult<()> {
        self.commit(WriteBatch::single(Record::RevenueEvent(event))).await
    }

    /// Verify the backing storage is reachable
    async fn health_check(&self) -> StatsResult<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
