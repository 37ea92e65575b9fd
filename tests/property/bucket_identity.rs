// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Bucket Resolution

use dataunion_stats::domain::{Address, BucketKind, BucketScope};
use dataunion_stats::resolver::{bucket_key, bucket_span, canonical_start, resolve};
use proptest::prelude::*;

fn kind() -> impl Strategy<Value = BucketKind> {
    prop_oneof![Just(BucketKind::Hour), Just(BucketKind::Day)]
}

fn address() -> impl Strategy<Value = Address> {
    "[0-9a-f]{40}".prop_map(|hex| Address::new(format!("0x{}", hex)).unwrap())
}

proptest! {
    /// Property: every timestamp lies inside its own window
    #[test]
    fn prop_window_contains_timestamp(kind in kind(), timestamp in 0u64..10_000_000_000) {
        let start = canonical_start(kind, timestamp);

        prop_assert!(start <= timestamp);
        prop_assert!(timestamp < start + bucket_span(kind));
        prop_assert_eq!(start % bucket_span(kind), 0);
    }

    /// Property: timestamps in the same span share one key
    #[test]
    fn prop_key_constant_within_span(
        kind in kind(),
        timestamp in 0u64..10_000_000_000,
        offset in 0u64..86_400,
    ) {
        let start = canonical_start(kind, timestamp);
        let sibling = start + offset % bucket_span(kind);

        prop_assert_eq!(bucket_key(kind, timestamp), bucket_key(kind, sibling));
    }

    /// Property: the next span opens a different bucket
    #[test]
    fn prop_next_span_differs(kind in kind(), timestamp in 0u64..10_000_000_000) {
        let next = canonical_start(kind, timestamp) + bucket_span(kind);

        prop_assert_ne!(bucket_key(kind, timestamp), bucket_key(kind, next));
        prop_assert_eq!(canonical_start(kind, next), next);
    }

    /// Property: global keys ignore the union, per-union keys separate them
    #[test]
    fn prop_scope_partitions_by_union(
        kind in kind(),
        timestamp in 0u64..10_000_000_000,
        a in address(),
        b in address(),
    ) {
        prop_assume!(a != b);

        let global_a = resolve(kind, timestamp, BucketScope::Global, &a);
        let global_b = resolve(kind, timestamp, BucketScope::Global, &b);
        prop_assert_eq!(&global_a, &global_b);
        prop_assert_eq!(global_a.key, bucket_key(kind, timestamp));

        let per_a = resolve(kind, timestamp, BucketScope::PerUnion, &a);
        let per_b = resolve(kind, timestamp, BucketScope::PerUnion, &b);
        prop_assert_ne!(&per_a.key, &per_b.key);
        prop_assert_eq!(per_a.start, per_b.start);
        prop_assert!(per_a.contains(timestamp));
    }
}
