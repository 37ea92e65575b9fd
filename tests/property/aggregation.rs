// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Aggregation
//!
//! Random membership and revenue sequences for one union, applied in
//! non-decreasing timestamp order, checked against a plain fold.

use std::collections::HashSet;
use std::sync::Arc;

use dataunion_stats::domain::{BucketKind, Wei};
use dataunion_stats::resolver::canonical_start;
use dataunion_stats::{DataUnionEvent, MemoryStore, StatsConfig};
use proptest::prelude::*;

use crate::fixtures::*;

const MEMBERS: [&str; 3] = [MEMBER_1, MEMBER_2, MEMBER_3];
const GENESIS: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
enum Op {
    Join(usize),
    Part(usize),
    Deposit(u64),
}

/// One applied event and the change it should cause
#[derive(Debug, Clone)]
struct Step {
    event: DataUnionEvent,
    timestamp: u64,
    members: i64,
    revenue: u64,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..MEMBERS.len()).prop_map(Op::Join),
        (0..MEMBERS.len()).prop_map(Op::Part),
        (1u64..1_000_000).prop_map(Op::Deposit),
    ]
}

/// Operations with the gap in seconds since the previous one
fn op_sequence() -> impl Strategy<Value = Vec<(Op, u64)>> {
    prop::collection::vec((op(), 0u64..20_000), 1..40)
}

/// A part for a member that never joined becomes a join
fn steps(ops: &[(Op, u64)]) -> Vec<Step> {
    let mut known = HashSet::new();
    let mut timestamp = GENESIS;

    ops.iter()
        .enumerate()
        .map(|(i, (op, gap))| {
            timestamp += gap;
            match op {
                Op::Join(m) | Op::Part(m) if !known.contains(m) => {
                    known.insert(*m);
                    Step {
                        event: joined(UNION_A, MEMBERS[*m], timestamp),
                        timestamp,
                        members: 1,
                        revenue: 0,
                    }
                }
                Op::Join(m) => Step {
                    event: joined(UNION_A, MEMBERS[*m], timestamp),
                    timestamp,
                    members: 1,
                    revenue: 0,
                },
                Op::Part(m) => Step {
                    event: parted(UNION_A, MEMBERS[*m], timestamp),
                    timestamp,
                    members: -1,
                    revenue: 0,
                },
                Op::Deposit(amount) => Step {
                    event: revenue(UNION_A, *amount, timestamp, i as u64, 0, 0),
                    timestamp,
                    members: 0,
                    revenue: *amount,
                },
            }
        })
        .collect()
}

fn run(steps: &[Step]) -> Arc<MemoryStore> {
    tokio_test::block_on(async {
        let (store, projection) = projection_with_unions(&[UNION_A], StatsConfig::default()).await;
        projection
            .replay(steps.iter().map(|s| s.event.clone()))
            .await
            .expect("Replay failed");
        store
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: totals equal joins minus parts and the sum of deposits
    #[test]
    fn prop_totals_match_fold(ops in op_sequence()) {
        let steps = steps(&ops);
        let store = run(&steps);

        let union = tokio_test::block_on(union_of(&store, UNION_A));
        let members: i64 = steps.iter().map(|s| s.members).sum();
        let revenue: u64 = steps.iter().map(|s| s.revenue).sum();

        prop_assert_eq!(union.member_count, members);
        prop_assert_eq!(union.revenue_wei, Wei::from(revenue));
    }

    /// Property: one audit record per deposit
    #[test]
    fn prop_one_revenue_record_per_deposit(ops in op_sequence()) {
        let steps = steps(&ops);
        let store = run(&steps);

        let deposits = steps.iter().filter(|s| s.revenue > 0).count();
        let log = tokio_test::block_on(store.revenue_events_for(&addr(UNION_A)));
        prop_assert_eq!(log.len(), deposits);
    }

    /// Property: a bucket holds exactly the changes inside its window,
    /// on top of the totals before its first event
    #[test]
    fn prop_bucket_conservation(ops in op_sequence()) {
        let steps = steps(&ops);
        let store = run(&steps);

        for kind in BucketKind::ALL {
            let buckets = tokio_test::block_on(store.buckets_for(kind));
            let starts: HashSet<u64> = steps
                .iter()
                .map(|s| canonical_start(kind, s.timestamp))
                .collect();
            prop_assert_eq!(buckets.len(), starts.len());

            for bucket in &buckets {
                let (before, inside): (Vec<&Step>, Vec<&Step>) = steps
                    .iter()
                    .filter(|s| s.timestamp < bucket.end_date)
                    .partition(|s| s.timestamp < bucket.start_date);
                prop_assert!(!inside.is_empty());

                let change: i64 = inside.iter().map(|s| s.members).sum();
                let earned: u64 = inside.iter().map(|s| s.revenue).sum();
                prop_assert_eq!(bucket.member_count_change, change);
                prop_assert_eq!(&bucket.revenue_change_wei, &Wei::from(earned));

                let at_start: i64 = before.iter().map(|s| s.members).sum();
                let revenue_at_start: u64 = before.iter().map(|s| s.revenue).sum();
                prop_assert_eq!(bucket.member_count_at_start, at_start);
                prop_assert_eq!(&bucket.revenue_at_start_wei, &Wei::from(revenue_at_start));
            }
        }
    }
}
