// Copyright (c) 2025 - Cowboy AI, Inc.
//! Plan Executor
//!
//! Interprets a [`Plan`] produced by the pure planner: anomalies become log
//! records, the write batch becomes one store commit.
//!
//! ```text
//! Plan ──> log anomalies ──> store.commit(WriteBatch) ──> ProjectionOutcome
//! ```

use tracing::{debug, error};

use super::pure::{Anomaly, Plan};
use super::ProjectionOutcome;
use crate::domain::Address;
use crate::errors::StatsResult;
use crate::store::EntityStore;

/// Log anomalies and commit the batch
///
/// Nothing is written when the batch is empty. A commit error is returned
/// unchanged and aborts the event.
pub async fn execute<S>(
    store: &S,
    event_type: &'static str,
    union: &Address,
    plan: Plan,
) -> StatsResult<ProjectionOutcome>
where
    S: EntityStore + ?Sized,
{
    for anomaly in &plan.anomalies {
        match anomaly {
            Anomaly::UnionNotFound { union } => {
                error!(union = %union, event_type, "Data union was not found, totals not updated");
            }
        }
    }

    let writes = plan.writes.len();
    if !plan.writes.is_empty() {
        store.commit(plan.writes).await?;
    }

    debug!(union = %union, event_type, writes, store = store.name(), "Event applied");

    Ok(ProjectionOutcome {
        event_type,
        union: union.clone(),
        writes,
        anomalies: plan.anomalies,
    })
}
