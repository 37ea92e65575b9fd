// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for dataunion-stats
//!
//! Deterministic addresses and event builders. All timestamps are explicit
//! block timestamps in seconds; nothing reads the clock.

#![allow(dead_code)]

use std::sync::Arc;

use dataunion_stats::domain::{Address, DataUnion, Wei};
use dataunion_stats::events::{
    DataUnionCreated, DataUnionEvent, MemberJoined, MemberParted, RevenueReceived,
};
use dataunion_stats::store::EntityStore;
use dataunion_stats::{MemoryStore, StatsConfig, StatsProjection};

pub const UNION_A: &str = "0x00000000000000000000000000000000000000a1";
pub const UNION_B: &str = "0x00000000000000000000000000000000000000b2";

pub const MEMBER_1: &str = "0x1234567890123456789012345678901234567890";
pub const MEMBER_2: &str = "0x1234567890123456789012345678901234567891";
pub const MEMBER_3: &str = "0x1234567890123456789012345678901234567892";

/// Parse a fixed address constant
pub fn addr(s: &str) -> Address {
    Address::new(s).expect("Invalid address in test fixture")
}

pub fn created(union: &str, timestamp: u64) -> DataUnionEvent {
    DataUnionCreated {
        union_address: addr(union),
        block_timestamp: timestamp,
    }
    .into()
}

pub fn joined(union: &str, member: &str, timestamp: u64) -> DataUnionEvent {
    MemberJoined {
        union_address: addr(union),
        member_address: addr(member),
        block_timestamp: timestamp,
    }
    .into()
}

pub fn parted(union: &str, member: &str, timestamp: u64) -> DataUnionEvent {
    MemberParted {
        union_address: addr(union),
        member_address: addr(member),
        block_timestamp: timestamp,
    }
    .into()
}

/// Revenue deposit logged at `(block, tx, log)`
pub fn revenue(union: &str, amount: u64, timestamp: u64, block: u64, tx: u64, log: u64) -> DataUnionEvent {
    RevenueReceived {
        union_address: addr(union),
        amount_wei: Wei::from(amount),
        block_timestamp: timestamp,
        block_number: block,
        transaction_index: tx,
        log_index: log,
    }
    .into()
}

/// Empty memory store and a projection over it
pub fn projection(config: StatsConfig) -> (Arc<MemoryStore>, StatsProjection<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let projection = StatsProjection::new(store.clone(), config);
    (store, projection)
}

/// Projection whose store already holds the given unions with zero totals
pub async fn projection_with_unions(
    unions: &[&str],
    config: StatsConfig,
) -> (Arc<MemoryStore>, StatsProjection<MemoryStore>) {
    let (store, projection) = projection(config);
    for union in unions {
        store
            .save_union(DataUnion::new(addr(union), Some(0)))
            .await
            .expect("Failed to seed union");
    }
    (store, projection)
}

pub async fn union_of(store: &MemoryStore, union: &str) -> DataUnion {
    store
        .load_union(&addr(union))
        .await
        .expect("Store read failed")
        .expect("Union missing from store")
}
