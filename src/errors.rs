// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for data union statistics operations

use thiserror::Error;

use crate::domain::{Address, AddressError};

/// Errors that abort the processing of a single event
///
/// Recoverable anomalies (a data union missing from the store) are not
/// errors; they are reported through
/// [`ProjectionOutcome::anomalies`](crate::projection::ProjectionOutcome).
#[derive(Debug, Error)]
pub enum StatsError {
    /// A part event arrived for a member that never joined
    #[error("Member {member} of data union {union} not found")]
    MemberNotFound {
        /// Member address from the part event
        member: Address,
        /// Data union the member was expected to belong to
        union: Address,
    },

    /// Strict ingestion saw a timestamp regression for a data union
    #[error("Out-of-order event for data union {union}: timestamp {timestamp} precedes {previous}")]
    OutOfOrder {
        /// Data union the events belong to
        union: Address,
        /// Latest timestamp already applied
        previous: u64,
        /// Timestamp of the rejected event
        timestamp: u64,
    },

    /// Store read or commit failure
    #[error("Store error: {0}")]
    Store(String),

    /// Address failed validation
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    /// Payload could not be decoded into a typed event
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// NATS connection or JetStream error
    #[error("NATS error: {0}")]
    Nats(String),

    /// The ingest worker has shut down
    #[error("Ingest worker is closed")]
    IngestClosed,
}

impl StatsError {
    /// Upstream protocol violations that redelivery cannot repair
    pub fn is_fatal_violation(&self) -> bool {
        matches!(
            self,
            StatsError::MemberNotFound { .. } | StatsError::OutOfOrder { .. }
        )
    }
}

/// Result type for data union statistics operations
pub type StatsResult<T> = Result<T, StatsError>;

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        StatsError::Serialization(err.to_string())
    }
}

impl From<async_nats::Error> for StatsError {
    fn from(err: async_nats::Error) -> Self {
        StatsError::Nats(err.to_string())
    }
}
