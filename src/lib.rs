// Copyright (c) 2025 - Cowboy AI, Inc.
//! Data union statistics
//!
//! Write-side aggregation of data union contract events. A chronological
//! stream of membership changes and revenue deposits is folded into:
//!
//! - current member count and lifetime revenue per data union
//! - hourly and daily buckets of changes with a baseline snapshot
//! - membership status per member
//! - an append-only audit log of revenue deposits
//!
//! ```text
//! JetStream ──> source ──> ingest (ordered) ──> StatsProjection ──> EntityStore
//!                                                    │
//!                                              resolver (buckets)
//! ```

pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ingest;
pub mod projection;
pub mod resolver;
pub mod source;
pub mod store;

// Re-export commonly used types
pub use config::{ProjectorConfig, StatsConfig};
pub use errors::{StatsError, StatsResult};
pub use events::DataUnionEvent;
pub use ingest::{IngestConfig, IngestHandle};
pub use projection::{Anomaly, ProjectionAdapter, ProjectionOutcome, StatsProjection};
pub use store::{EntityStore, KvEntityStore, MemoryStore};
