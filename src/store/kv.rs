// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream key-value entity store
//!
//! Records are stored as JSON under `{kind}.{id}` keys in a single KV bucket.
//!
//! # Batch Commit
//!
//! JetStream KV has no multi-key transactions, so a batch is made
//! all-or-nothing with an undo journal:
//!
//! ```text
//! read previous values ──> put JOURNAL_KEY ──> put records ──> delete JOURNAL_KEY
//! ```
//!
//! A journal left behind means a commit was interrupted. It is rolled back
//! (every key restored to its previous value, or deleted when it had none)
//! when the store is opened and before the next load or commit after a
//! failure. The event that failed is then redelivered and applied once on
//! the restored state.
//!
//! The journal assumes a single writer per bucket.

use async_nats::jetstream::{self, kv};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use super::{EntityStore, Record, RecordKind, WriteBatch};
use crate::domain::{Address, Bucket, DataUnion, Member, RevenueEvent};
use crate::errors::{StatsError, StatsResult};

/// Key of the undo journal of an in-flight commit
pub const JOURNAL_KEY: &str = "journal.pending";

/// Flat key for a record in the KV bucket
pub fn kv_key(kind: RecordKind, id: &str) -> String {
    format!("{}.{}", kind.prefix(), id)
}

/// Value a key held before the interrupted commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoEntry {
    pub key: String,
    /// `None` when the key did not exist
    pub previous: Option<serde_json::Value>,
}

/// Before-images of every key a commit writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoJournal {
    pub entries: Vec<UndoEntry>,
}

impl UndoJournal {
    pub fn covers(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Keep the first before-image of a key; later writes in the same batch
    /// must not overwrite it
    pub fn capture(&mut self, key: &str, previous: Option<serde_json::Value>) {
        if !self.covers(key) {
            self.entries.push(UndoEntry {
                key: key.to_string(),
                previous,
            });
        }
    }
}

/// Serialize a batch into `(key, payload)` pairs, data union records last
pub fn encode_batch(batch: WriteBatch) -> StatsResult<Vec<(String, Vec<u8>)>> {
    let (unions, rest): (Vec<Record>, Vec<Record>) = batch
        .into_iter()
        .partition(|r| r.kind() == RecordKind::DataUnion);

    rest.iter()
        .chain(unions.iter())
        .map(|record| -> StatsResult<(String, Vec<u8>)> {
            let payload = match record {
                Record::DataUnion(r) => serde_json::to_vec(r)?,
                Record::Member(r) => serde_json::to_vec(r)?,
                Record::Bucket(r) => serde_json::to_vec(r)?,
                Record::RevenueEvent(r) => serde_json::to_vec(r)?,
            };
            Ok((kv_key(record.kind(), record.id()), payload))
        })
        .collect()
}

/// Entity store backed by a JetStream KV bucket
pub struct KvEntityStore {
    kv: kv::Store,
    bucket: String,
    /// A commit failed after its journal may have been written
    pending: AtomicBool,
}

impl KvEntityStore {
    /// Open the bucket, creating it on first use, and roll back any
    /// interrupted commit
    pub async fn open(jetstream: &jetstream::Context, bucket: &str) -> StatsResult<Self> {
        let kv = match jetstream.get_key_value(bucket).await {
            Ok(kv) => {
                info!(bucket, "Found existing KV bucket");
                kv
            }
            Err(_) => {
                info!(bucket, "KV bucket not found, creating");
                jetstream
                    .create_key_value(kv::Config {
                        bucket: bucket.to_string(),
                        description: "Data union statistics".to_string(),
                        history: 1,
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| StatsError::Store(format!("failed to create KV bucket {}: {}", bucket, e)))?
            }
        };

        let store = Self {
            kv,
            bucket: bucket.to_string(),
            pending: AtomicBool::new(false),
        };
        store.recover().await?;
        Ok(store)
    }

    /// Roll back an interrupted commit, if its journal is still present
    ///
    /// Returns whether a rollback happened.
    pub async fn recover(&self) -> StatsResult<bool> {
        let journal: UndoJournal = match self.get_raw(JOURNAL_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => {
                self.pending.store(false, Ordering::SeqCst);
                return Ok(false);
            }
        };

        warn!(
            bucket = %self.bucket,
            keys = journal.entries.len(),
            "Rolling back interrupted commit"
        );

        for entry in journal.entries.iter().rev() {
            match &entry.previous {
                Some(value) => self.put_raw(&entry.key, serde_json::to_vec(value)?).await?,
                None => self.delete_raw(&entry.key).await?,
            }
        }

        self.delete_raw(JOURNAL_KEY).await?;
        self.pending.store(false, Ordering::SeqCst);
        Ok(true)
    }

    async fn recover_if_pending(&self) -> StatsResult<()> {
        if self.pending.load(Ordering::SeqCst) {
            self.recover().await?;
        }
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> StatsResult<Option<Vec<u8>>> {
        let value = self
            .kv
            .get(key)
            .await
            .map_err(|e| StatsError::Store(format!("failed to read {}: {}", key, e)))?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    async fn put_raw(&self, key: &str, payload: Vec<u8>) -> StatsResult<()> {
        self.kv
            .put(key, payload.into())
            .await
            .map_err(|e| StatsError::Store(format!("failed to write {}: {}", key, e)))?;

        debug!(key, "Wrote record");
        Ok(())
    }

    async fn delete_raw(&self, key: &str) -> StatsResult<()> {
        self.kv
            .delete(key)
            .await
            .map_err(|e| StatsError::Store(format!("failed to delete {}: {}", key, e)))
    }

    async fn get<T: DeserializeOwned>(&self, kind: RecordKind, id: &str) -> StatsResult<Option<T>> {
        self.recover_if_pending().await?;

        match self.get_raw(&kv_key(kind, id)).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_batch(&self, writes: Vec<(String, Vec<u8>)>) -> StatsResult<()> {
        let mut journal = UndoJournal::default();
        for (key, _) in &writes {
            if journal.covers(key) {
                continue;
            }
            let previous = match self.get_raw(key).await? {
                Some(bytes) => Some(serde_json::from_slice(&bytes)?),
                None => None,
            };
            journal.capture(key, previous);
        }

        self.pending.store(true, Ordering::SeqCst);
        self.put_raw(JOURNAL_KEY, serde_json::to_vec(&journal)?).await?;

        for (key, payload) in writes {
            self.put_raw(&key, payload).await?;
        }

        self.delete_raw(JOURNAL_KEY).await?;
        self.pending.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl EntityStore for KvEntityStore {
    async fn load_union(&self, id: &Address) -> StatsResult<Option<DataUnion>> {
        self.get(RecordKind::DataUnion, id.as_str()).await
    }

    async fn load_member(&self, id: &str) -> StatsResult<Option<Member>> {
        self.get(RecordKind::Member, id).await
    }

    async fn load_bucket(&self, id: &str) -> StatsResult<Option<Bucket>> {
        self.get(RecordKind::Bucket, id).await
    }

    async fn load_revenue_event(&self, id: &str) -> StatsResult<Option<RevenueEvent>> {
        self.get(RecordKind::RevenueEvent, id).await
    }

    async fn commit(&self, batch: WriteBatch) -> StatsResult<()> {
        self.recover_if_pending().await?;

        let writes = encode_batch(batch)?;
        if writes.is_empty() {
            return Ok(());
        }

        let count = writes.len();
        self.write_batch(writes).await?;
        debug!(bucket = %self.bucket, writes = count, "Committed batch to KV bucket");
        Ok(())
    }

    async fn health_check(&self) -> StatsResult<()> {
        self.kv
            .status()
            .await
            .map_err(|e| StatsError::Store(format!("KV bucket {} unavailable: {}", self.bucket, e)))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "nats-kv"
    }
}
