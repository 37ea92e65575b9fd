// Copyright (c) 2025 - Cowboy AI, Inc.
//! Ordered Ingest Queue
//!
//! A bounded single-consumer channel in front of a projection. Producers
//! submit decoded events through an [`IngestHandle`]; one worker task
//! applies them strictly in arrival order and answers each submission with
//! the projection's result.
//!
//! ```text
//! source ──submit──> mpsc (bounded) ──> worker ──project──> store
//!    ▲                                     │
//!    └──────────── oneshot result ─────────┘
//! ```
//!
//! The worker also watches the ordering precondition: a timestamp lower
//! than the last one applied for the same union is logged, or rejected with
//! [`StatsError::OutOfOrder`] in strict mode.

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::Address;
use crate::errors::{StatsError, StatsResult};
use crate::events::DataUnionEvent;
use crate::projection::{ProjectionAdapter, ProjectionOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Events buffered before `submit` waits
    pub capacity: usize,
    /// Reject timestamp regressions instead of logging them
    pub strict_ordering: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            strict_ordering: false,
        }
    }
}

struct Job {
    event: DataUnionEvent,
    reply: oneshot::Sender<StatsResult<ProjectionOutcome>>,
}

/// Producer side of the ingest queue
#[derive(Clone)]
pub struct IngestHandle {
    tx: mpsc::Sender<Job>,
}

impl IngestHandle {
    /// Queue one event and wait for it to be applied
    pub async fn submit(&self, event: DataUnionEvent) -> StatsResult<ProjectionOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job { event, reply })
            .await
            .map_err(|_| StatsError::IngestClosed)?;

        rx.await.map_err(|_| StatsError::IngestClosed)?
    }
}

/// Latest applied timestamp per union
#[derive(Debug, Default)]
pub struct OrderGuard {
    strict: bool,
    last_seen: HashMap<Address, u64>,
}

impl OrderGuard {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            last_seen: HashMap::new(),
        }
    }

    pub fn check(&self, event: &DataUnionEvent) -> StatsResult<()> {
        let union = event.union_address();
        let timestamp = event.block_timestamp();

        match self.last_seen.get(union) {
            Some(&previous) if timestamp < previous => {
                if self.strict {
                    return Err(StatsError::OutOfOrder {
                        union: union.clone(),
                        previous,
                        timestamp,
                    });
                }
                warn!(union = %union, previous, timestamp, "Event timestamp regressed");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn record(&mut self, event: &DataUnionEvent) {
        let entry = self
            .last_seen
            .entry(event.union_address().clone())
            .or_insert(0);
        *entry = (*entry).max(event.block_timestamp());
    }
}

/// Start the worker task that owns `projection`
///
/// The worker stops once every [`IngestHandle`] has been dropped.
pub fn spawn<P>(mut projection: P, config: IngestConfig) -> (IngestHandle, JoinHandle<()>)
where
    P: ProjectionAdapter<Event = DataUnionEvent, Outcome = ProjectionOutcome, Error = StatsError> + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Job>(config.capacity.max(1));

    let worker = tokio::spawn(async move {
        info!(projection = projection.name(), capacity = config.capacity, "Starting ingest worker");
        let mut guard = OrderGuard::new(config.strict_ordering);

        while let Some(Job { event, reply }) = rx.recv().await {
            let result = match guard.check(&event) {
                Ok(()) => {
                    let applied = projection.project(event.clone()).await;
                    if applied.is_ok() {
                        guard.record(&event);
                    }
                    applied
                }
                Err(e) => Err(e),
            };

            if let Err(e) = &result {
                error!(
                    union = %event.union_address(),
                    event_type = event.event_type(),
                    "Failed to apply event: {}",
                    e
                );
            }

            // The submitter may have given up waiting; the event is applied either way.
            let _ = reply.send(result);
        }

        info!("Ingest worker stopped");
    });

    (IngestHandle { tx }, worker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsConfig;
    use crate::events::{MemberJoined, MemberParted};
    use crate::projection::StatsProjection;
    use crate::store::{EntityStore, MemoryStore};
    use std::sync::Arc;

    fn address(c: char) -> Address {
        Address::new(format!("0x{}", c.to_string().repeat(40))).unwrap()
    }

    fn joined(member: char, timestamp: u64) -> DataUnionEvent {
        MemberJoined {
            union_address: address('a'),
            member_address: address(member),
            block_timestamp: timestamp,
        }
        .into()
    }

    #[test]
    fn test_guard_lenient_and_strict() {
        let mut lenient = OrderGuard::new(false);
        lenient.record(&joined('1', 500));
        assert!(lenient.check(&joined('2', 400)).is_ok());

        let mut strict = OrderGuard::new(true);
        strict.record(&joined('1', 500));
        assert!(strict.check(&joined('2', 500)).is_ok());
        match strict.check(&joined('2', 499)) {
            Err(StatsError::OutOfOrder { previous, timestamp, .. }) => {
                assert_eq!((previous, timestamp), (500, 499));
            }
            other => panic!("expected out-of-order rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_worker_applies_in_order() {
        let store = Arc::new(MemoryStore::new());
        let projection = StatsProjection::new(store.clone(), StatsConfig::default());
        let (handle, worker) = spawn(projection, IngestConfig::default());

        handle.submit(joined('1', 100)).await.unwrap();
        handle.submit(joined('2', 200)).await.unwrap();
        let parted = handle
            .submit(
                MemberParted {
                    union_address: address('a'),
                    member_address: address('1'),
                    block_timestamp: 300,
                }
                .into(),
            )
            .await
            .unwrap();
        assert_eq!(parted.event_type, "MemberParted");

        drop(handle);
        worker.await.unwrap();

        let member = store
            .load_member(&crate::domain::member_id(&address('1'), &address('a')))
            .await
            .unwrap()
            .unwrap();
        assert!(!member.is_active());
    }

    #[tokio::test]
    async fn test_worker_strict_rejects_regression() {
        let store = Arc::new(MemoryStore::new());
        let projection = StatsProjection::new(store.clone(), StatsConfig::default());
        let (handle, _worker) = spawn(
            projection,
            IngestConfig {
                capacity: 4,
                strict_ordering: true,
            },
        );

        handle.submit(joined('1', 1_000)).await.unwrap();
        let before = store.record_count().await;

        let err = handle.submit(joined('2', 10)).await.unwrap_err();
        assert!(err.is_fatal_violation());
        assert_eq!(store.record_count().await, before);
    }

    #[tokio::test]
    async fn test_worker_reports_fatal_part() {
        let store = Arc::new(MemoryStore::new());
        let projection = StatsProjection::new(store, StatsConfig::default());
        let (handle, _worker) = spawn(projection, IngestConfig::default());

        let err = handle
            .submit(
                MemberParted {
                    union_address: address('a'),
                    member_address: address('9'),
                    block_timestamp: 1,
                }
                .into(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StatsError::MemberNotFound { .. }));
    }
}
