// Copyright (c) 2025 - Cowboy AI, Inc.
//! Immutable revenue audit log entries

use serde::{Deserialize, Serialize};

use super::{Address, Wei};

/// Coordinates of a log entry on chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogPosition {
    pub block_number: u64,
    pub transaction_index: u64,
    /// Index of the log within its transaction
    pub log_index: u64,
}

impl LogPosition {
    /// `{union}-{block}-{txIndexHex}-{logIndex}`, unique per on-chain log
    pub fn revenue_event_id(&self, union: &Address) -> String {
        format!(
            "{}-{}-{:#x}-{}",
            union, self.block_number, self.transaction_index, self.log_index
        )
    }
}

/// One revenue deposit keyed by its log position; a redelivery overwrites it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueEvent {
    pub id: String,
    pub data_union: Address,
    pub amount_wei: Wei,
    pub date: u64,
}

impl RevenueEvent {
    pub fn new(data_union: Address, position: &LogPosition, amount_wei: Wei, date: u64) -> Self {
        Self {
            id: position.revenue_event_id(&data_union),
            data_union,
            amount_wei,
            date,
        }
    }
}
