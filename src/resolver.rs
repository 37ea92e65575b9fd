// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bucket Resolver
//!
//! Pure mapping from `(kind, timestamp)` to a canonical bucket window:
//!
//! ```text
//! start = timestamp - (timestamp mod span(kind))
//! end   = start + span(kind)         (saturating at u64::MAX)
//! key   = "{kind}-{start}"            (BucketScope::Global)
//! key   = "{kind}-{union}-{start}"    (BucketScope::PerUnion)
//! ```
//!
//! No I/O, no clock: the same inputs always produce the same window.

use tracing::error;

use crate::domain::{Address, BucketKind, BucketScope};

pub const HOUR_SECONDS: u64 = 60 * 60;
pub const DAY_SECONDS: u64 = 24 * 60 * 60;

/// Length of a bucket kind in seconds
pub fn bucket_span(kind: BucketKind) -> u64 {
    match kind {
        BucketKind::Hour => HOUR_SECONDS,
        BucketKind::Day => DAY_SECONDS,
    }
}

/// Span for an untyped kind label
///
/// Unknown labels are logged and resolve to a zero-length span; callers
/// get a degenerate window starting at the timestamp itself.
pub fn span_for_label(label: &str) -> u64 {
    match label.parse::<BucketKind>() {
        Ok(kind) => bucket_span(kind),
        Err(e) => {
            error!(label, "{}", e);
            0
        }
    }
}

/// Largest multiple of `span` not exceeding `timestamp`
///
/// A zero span leaves the timestamp unchanged.
pub fn floor_to_span(timestamp: u64, span: u64) -> u64 {
    timestamp
        .checked_rem(span)
        .map_or(timestamp, |offset| timestamp - offset)
}

pub fn canonical_start(kind: BucketKind, timestamp: u64) -> u64 {
    floor_to_span(timestamp, bucket_span(kind))
}

/// Global bucket key: `{kind}-{canonicalStart}`
pub fn bucket_key(kind: BucketKind, timestamp: u64) -> String {
    format!("{}-{}", kind, canonical_start(kind, timestamp))
}

/// Resolved identity and span of one bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketWindow {
    pub kind: BucketKind,
    pub key: String,
    pub start: u64,
    pub end: u64,
}

impl BucketWindow {
    pub fn contains(&self, timestamp: u64) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

/// Resolve the window an event at `timestamp` for `union` lands in
pub fn resolve(kind: BucketKind, timestamp: u64, scope: BucketScope, union: &Address) -> BucketWindow {
    let span = bucket_span(kind);
    let start = floor_to_span(timestamp, span);
    let key = match scope {
        BucketScope::Global => format!("{}-{}", kind, start),
        BucketScope::PerUnion => format!("{}-{}-{}", kind, union, start),
    };

    BucketWindow {
        kind,
        key,
        start,
        end: start.saturating_add(span),
    }
}
