// Copyright (c) 2025 - Cowboy AI, Inc.
//! Data union contract events
//!
//! Each struct is one decoded chain log. Timestamps are block timestamps in
//! seconds; the delivery mechanism guarantees block order.

use serde::{Deserialize, Serialize};

use crate::domain::{Address, LogPosition, Wei};
use crate::errors::{StatsError, StatsResult};

/// Largest block timestamp accepted from the wire, in seconds
pub const MAX_BLOCK_TIMESTAMP: u64 = i64::MAX as u64;

/// Factory deployed a new data union
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataUnionCreated {
    pub union_address: Address,
    pub block_timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberJoined {
    pub union_address: Address,
    pub member_address: Address,
    pub block_timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberParted {
    pub union_address: Address,
    pub member_address: Address,
    pub block_timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueReceived {
    pub union_address: Address,
    pub amount_wei: Wei,
    pub block_timestamp: u64,
    pub block_number: u64,
    pub transaction_index: u64,
    pub log_index: u64,
}

impl RevenueReceived {
    pub fn position(&self) -> LogPosition {
        LogPosition {
            block_number: self.block_number,
            transaction_index: self.transaction_index,
            log_index: self.log_index,
        }
    }
}

/// Wire envelope, tagged by `type`
///
/// ```json
/// {"type": "member_joined", "union_address": "0x…", "member_address": "0x…", "block_timestamp": 100}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataUnionEvent {
    DataUnionCreated(DataUnionCreated),
    MemberJoined(MemberJoined),
    MemberParted(MemberParted),
    RevenueReceived(RevenueReceived),
}

impl DataUnionEvent {
    pub fn union_address(&self) -> &Address {
        match self {
            DataUnionEvent::DataUnionCreated(e) => &e.union_address,
            DataUnionEvent::MemberJoined(e) => &e.union_address,
            DataUnionEvent::MemberParted(e) => &e.union_address,
            DataUnionEvent::RevenueReceived(e) => &e.union_address,
        }
    }

    pub fn block_timestamp(&self) -> u64 {
        match self {
            DataUnionEvent::DataUnionCreated(e) => e.block_timestamp,
            DataUnionEvent::MemberJoined(e) => e.block_timestamp,
            DataUnionEvent::MemberParted(e) => e.block_timestamp,
            DataUnionEvent::RevenueReceived(e) => e.block_timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            DataUnionEvent::DataUnionCreated(_) => "DataUnionCreated",
            DataUnionEvent::MemberJoined(_) => "MemberJoined",
            DataUnionEvent::MemberParted(_) => "MemberParted",
            DataUnionEvent::RevenueReceived(_) => "RevenueReceived",
        }
    }

    /// Decode a JSON payload delivered by the event source
    ///
    /// Timestamps above [`MAX_BLOCK_TIMESTAMP`] are rejected.
    pub fn decode(payload: &[u8]) -> StatsResult<Self> {
        let event: Self =
            serde_json::from_slice(payload).map_err(|e| StatsError::InvalidEvent(e.to_string()))?;

        if event.block_timestamp() > MAX_BLOCK_TIMESTAMP {
            return Err(StatsError::InvalidEvent(format!(
                "{} block_timestamp {} is out of range",
                event.event_type(),
                event.block_timestamp()
            )));
        }

        Ok(event)
    }

    pub fn encode(&self) -> StatsResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl From<DataUnionCreated> for DataUnionEvent {
    fn from(event: DataUnionCreated) -> Self {
        DataUnionEvent::DataUnionCreated(event)
    }
}

impl From<MemberJoined> for DataUnionEvent {
    fn from(event: MemberJoined) -> Self {
        DataUnionEvent::MemberJoined(event)
    }
}

impl From<MemberParted> for DataUnionEvent {
    fn from(event: MemberParted) -> Self {
        DataUnionEvent::MemberParted(event)
    }
}

impl From<RevenueReceived> for DataUnionEvent {
    fn from(event: RevenueReceived) -> Self {
        DataUnionEvent::RevenueReceived(event)
    }
}
