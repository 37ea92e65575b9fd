// Copyright (c) 2025 - Cowboy AI, Inc.
//! Data union aggregate record

use serde::{Deserialize, Serialize};

use super::{Address, Wei};

/// Running totals of a data union
///
/// `member_count` equals the number of ACTIVE members only while the event
/// stream never rejoins an already active member; rejoins are counted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataUnion {
    pub id: Address,
    pub member_count: i64,
    pub revenue_wei: Wei,
    /// Block timestamp of the deployment event, when it was observed
    #[serde(default)]
    pub created_at: Option<u64>,
}

impl DataUnion {
    pub fn new(id: Address, created_at: Option<u64>) -> Self {
        Self {
            id,
            member_count: 0,
            revenue_wei: Wei::zero(),
            created_at,
        }
    }

    pub fn totals(&self) -> UnionTotals {
        UnionTotals {
            member_count: self.member_count,
            revenue_wei: self.revenue_wei.clone(),
        }
    }

    pub fn apply(&mut self, delta: &StatsDelta) {
        self.member_count += delta.member_count;
        self.revenue_wei += &delta.revenue_wei;
    }
}

/// Snapshot of a union's totals, used as bucket baseline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnionTotals {
    pub member_count: i64,
    pub revenue_wei: Wei,
}

/// Change produced by a single event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsDelta {
    pub member_count: i64,
    pub revenue_wei: Wei,
}

impl StatsDelta {
    pub fn members(change: i64) -> Self {
        Self {
            member_count: change,
            revenue_wei: Wei::zero(),
        }
    }

    pub fn revenue(amount: Wei) -> Self {
        Self {
            member_count: 0,
            revenue_wei: amount,
        }
    }
}
