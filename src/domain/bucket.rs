// Copyright (c) 2025 - Cowboy AI, Inc.
//! Time-bucketed statistics records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{Address, StatsDelta, UnionTotals, Wei};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BucketError {
    #[error("Unknown bucket kind: {0}")]
    UnknownKind(String),

    #[error("Unknown bucket scope: {0}")]
    UnknownScope(String),
}

/// Length of a statistics bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BucketKind {
    Hour,
    Day,
}

impl BucketKind {
    /// Every kind maintained for each event, in update order
    pub const ALL: [BucketKind; 2] = [BucketKind::Hour, BucketKind::Day];

    pub fn label(&self) -> &'static str {
        match self {
            BucketKind::Hour => "HOUR",
            BucketKind::Day => "DAY",
        }
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BucketKind {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HOUR" => Ok(BucketKind::Hour),
            "DAY" => Ok(BucketKind::Day),
            other => Err(BucketError::UnknownKind(other.to_string())),
        }
    }
}

/// How bucket identities are partitioned
///
/// `Global` keys a bucket by kind and start time only, so every data union
/// whose events fall into the same window shares one record and the
/// `data_union` field names the last writer. `PerUnion` adds the union
/// address to the key and gives each union its own series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketScope {
    #[default]
    Global,
    PerUnion,
}

impl FromStr for BucketScope {
    type Err = BucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(BucketScope::Global),
            "per-union" | "per_union" => Ok(BucketScope::PerUnion),
            other => Err(BucketError::UnknownScope(other.to_string())),
        }
    }
}

/// Statistics for one time window
///
/// The `*_at_start` fields are the baseline snapshot taken when the bucket
/// was first materialized; the `*_change` fields accumulate every delta
/// that landed in the window afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub kind: BucketKind,
    /// Union whose event touched this bucket most recently
    pub data_union: Address,
    pub start_date: u64,
    pub end_date: u64,
    pub member_count_at_start: i64,
    pub revenue_at_start_wei: Wei,
    pub member_count_change: i64,
    pub revenue_change_wei: Wei,
}

impl Bucket {
    /// Fresh bucket with zero deltas on top of `baseline`
    pub fn open(
        id: String,
        kind: BucketKind,
        data_union: Address,
        start_date: u64,
        end_date: u64,
        baseline: &UnionTotals,
    ) -> Self {
        Self {
            id,
            kind,
            data_union,
            start_date,
            end_date,
            member_count_at_start: baseline.member_count,
            revenue_at_start_wei: baseline.revenue_wei.clone(),
            member_count_change: 0,
            revenue_change_wei: Wei::zero(),
        }
    }

    pub fn accumulate(&mut self, delta: &StatsDelta) {
        self.member_count_change += delta.member_count;
        self.revenue_change_wei += &delta.revenue_wei;
    }

    pub fn member_count_at_end(&self) -> i64 {
        self.member_count_at_start + self.member_count_change
    }

    pub fn revenue_at_end_wei(&self) -> Wei {
        self.revenue_at_start_wei.clone() + &self.revenue_change_wei
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.start_date)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
