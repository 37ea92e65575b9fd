// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Aggregation Planning
//!
//! Every event is planned as a pure function of the records it reads:
//!
//! ```text
//! (ReadSet, Event) → Plan { WriteBatch, Anomalies }
//! ```
//!
//! ```text
//! Pure Planning                     Executor
//! ─────────────                     ────────
//! (ReadSet, Event)                  Plan
//!      │                              │
//!      ▼                              ▼
//! ┌──────────────┐   WriteBatch  ┌──────────────┐
//! │    plan()    │ ────────────> │  execute()   │
//! │  pure func   │   Anomalies   │  store I/O   │
//! └──────────────┘               └──────────────┘
//! ```
//!
//! The store is never touched here, and anomalies are returned as data
//! rather than logged, so the same inputs always yield the same plan.
//!
//! # Bucket Baseline
//!
//! A bucket created by an event snapshots the union totals as they stood
//! *before* that event's deltas. Buckets that already exist are reused
//! unchanged apart from the accumulated deltas and the last-writer field.

use std::collections::HashMap;
use std::fmt;

use crate::config::StatsConfig;
use crate::domain::{
    member_id, Address, Bucket, BucketKind, DataUnion, Member, RevenueEvent, StatsDelta, UnionTotals,
};
use crate::errors::{StatsError, StatsResult};
use crate::events::{DataUnionCreated, DataUnionEvent, MemberJoined, MemberParted, RevenueReceived};
use crate::resolver::{self, BucketWindow};
use crate::store::{Record, WriteBatch};

/// Recoverable condition observed while planning an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// The union's totals were not updated; buckets used a zero baseline
    UnionNotFound { union: Address },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnionNotFound { union } => write!(f, "Data union not found: {}", union),
        }
    }
}

/// Store keys an event needs before it can be planned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadKeys {
    pub union: Address,
    pub member: Option<String>,
    pub buckets: Vec<BucketWindow>,
}

/// Records loaded for one event
#[derive(Debug, Clone, Default)]
pub struct ReadSet {
    pub union: Option<DataUnion>,
    pub member: Option<Member>,
    /// Existing buckets by key; absent keys are materialized
    pub buckets: HashMap<String, Bucket>,
}

/// Writes and anomalies for one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub writes: WriteBatch,
    pub anomalies: Vec<Anomaly>,
}

/// Windows touched by an event at `timestamp`, one per bucket kind
pub fn bucket_windows(union: &Address, timestamp: u64, config: &StatsConfig) -> Vec<BucketWindow> {
    BucketKind::ALL
        .iter()
        .map(|kind| resolver::resolve(*kind, timestamp, config.bucket_scope, union))
        .collect()
}

/// Keys to load before calling [`plan`]
pub fn read_keys(event: &DataUnionEvent, config: &StatsConfig) -> ReadKeys {
    let union = event.union_address().clone();

    match event {
        DataUnionEvent::DataUnionCreated(_) => ReadKeys {
            union,
            member: None,
            buckets: Vec::new(),
        },
        DataUnionEvent::MemberParted(e) => ReadKeys {
            member: Some(member_id(&e.member_address, &e.union_address)),
            buckets: bucket_windows(&union, e.block_timestamp, config),
            union,
        },
        DataUnionEvent::MemberJoined(_) | DataUnionEvent::RevenueReceived(_) => ReadKeys {
            buckets: bucket_windows(&union, event.block_timestamp(), config),
            member: None,
            union,
        },
    }
}

/// Existing bucket, or a new one opened on `baseline`
///
/// This is the pure half of get-or-create: the caller supplies the store
/// read and persists the result.
pub fn materialize_bucket(
    existing: Option<&Bucket>,
    window: &BucketWindow,
    union: &Address,
    baseline: &UnionTotals,
) -> Bucket {
    match existing {
        Some(bucket) => bucket.clone(),
        None => Bucket::open(
            window.key.clone(),
            window.kind,
            union.clone(),
            window.start,
            window.end,
            baseline,
        ),
    }
}

/// Plan the writes for one event
///
/// Fails only when a member parts without a member record; in that case no
/// writes are produced at all.
pub fn plan(event: &DataUnionEvent, reads: &ReadSet, config: &StatsConfig) -> StatsResult<Plan> {
    match event {
        DataUnionEvent::DataUnionCreated(e) => Ok(plan_created(e, reads)),
        DataUnionEvent::MemberJoined(e) => Ok(plan_joined(e, reads, config)),
        DataUnionEvent::MemberParted(e) => plan_parted(e, reads, config),
        DataUnionEvent::RevenueReceived(e) => Ok(plan_revenue(e, reads, config)),
    }
}

fn plan_created(event: &DataUnionCreated, reads: &ReadSet) -> Plan {
    let mut plan = Plan::default();
    if reads.union.is_none() {
        plan.writes.push(Record::DataUnion(DataUnion::new(
            event.union_address.clone(),
            Some(event.block_timestamp),
        )));
    }
    plan
}

fn plan_joined(event: &MemberJoined, reads: &ReadSet, config: &StatsConfig) -> Plan {
    let mut plan = Plan::default();
    plan.writes.push(Record::Member(Member::joined(
        event.member_address.clone(),
        event.union_address.clone(),
        event.block_timestamp,
    )));

    plan_union_update(
        &mut plan,
        reads,
        &event.union_address,
        event.block_timestamp,
        &StatsDelta::members(1),
        config,
    );
    plan
}

fn plan_parted(event: &MemberParted, reads: &ReadSet, config: &StatsConfig) -> StatsResult<Plan> {
    let mut member = reads.member.clone().ok_or_else(|| StatsError::MemberNotFound {
        member: event.member_address.clone(),
        union: event.union_address.clone(),
    })?;
    member.part();

    let mut plan = Plan::default();
    plan.writes.push(Record::Member(member));

    plan_union_update(
        &mut plan,
        reads,
        &event.union_address,
        event.block_timestamp,
        &StatsDelta::members(-1),
        config,
    );
    Ok(plan)
}

fn plan_revenue(event: &RevenueReceived, reads: &ReadSet, config: &StatsConfig) -> Plan {
    let mut plan = Plan::default();

    plan_union_update(
        &mut plan,
        reads,
        &event.union_address,
        event.block_timestamp,
        &StatsDelta::revenue(event.amount_wei.clone()),
        config,
    );

    plan.writes.push(Record::RevenueEvent(RevenueEvent::new(
        event.union_address.clone(),
        &event.position(),
        event.amount_wei.clone(),
        event.block_timestamp,
    )));
    plan
}

/// Union totals plus the HOUR and DAY buckets, always as one unit
///
/// A missing union skips only the totals update; buckets still move, from
/// a zero baseline.
pub fn plan_union_update(
    plan: &mut Plan,
    reads: &ReadSet,
    union: &Address,
    timestamp: u64,
    delta: &StatsDelta,
    config: &StatsConfig,
) {
    let baseline = reads.union.as_ref().map(DataUnion::totals).unwrap_or_default();

    match &reads.union {
        Some(existing) => {
            let mut updated = existing.clone();
            updated.apply(delta);
            plan.writes.push(Record::DataUnion(updated));
        }
        None => plan.anomalies.push(Anomaly::UnionNotFound {
            union: union.clone(),
        }),
    }

    for window in bucket_windows(union, timestamp, config) {
        let mut bucket = materialize_bucket(reads.buckets.get(&window.key), &window, union, &baseline);
        bucket.accumulate(delta);
        bucket.data_union = union.clone();
        plan.writes.push(Record::Bucket(bucket));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BucketScope, MemberStatus, Wei};
    use pretty_assertions::assert_eq;

    fn address(c: char) -> Address {
        Address::new(format!("0x{}", c.to_string().repeat(40))).unwrap()
    }

    fn joined(timestamp: u64) -> DataUnionEvent {
        MemberJoined {
            union_address: address('a'),
            member_address: address('1'),
            block_timestamp: timestamp,
        }
        .into()
    }

    fn buckets(plan: &Plan) -> Vec<&Bucket> {
        plan.writes
            .iter()
            .filter_map(|r| match r {
                Record::Bucket(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_join_with_existing_union() {
        let reads = ReadSet {
            union: Some(DataUnion::new(address('a'), Some(0))),
            ..Default::default()
        };

        let plan = plan(&joined(100), &reads, &StatsConfig::default()).unwrap();

        assert!(plan.anomalies.is_empty());
        assert_eq!(plan.writes.len(), 4); // member + union + hour + day

        let union = plan
            .writes
            .iter()
            .find_map(|r| match r {
                Record::DataUnion(u) => Some(u),
                _ => None,
            })
            .unwrap();
        assert_eq!(union.member_count, 1);

        let buckets = buckets(&plan);
        assert_eq!(buckets[0].id, "HOUR-0");
        assert_eq!(buckets[0].member_count_at_start, 0);
        assert_eq!(buckets[0].member_count_change, 1);
        assert_eq!(buckets[1].id, "DAY-0");
        assert_eq!(buckets[1].end_date, 86_400);
    }

    #[test]
    fn test_join_with_missing_union_is_anomaly() {
        let plan = plan(&joined(100), &ReadSet::default(), &StatsConfig::default()).unwrap();

        assert_eq!(plan.anomalies, vec![Anomaly::UnionNotFound { union: address('a') }]);
        assert!(!plan.writes.iter().any(|r| matches!(r, Record::DataUnion(_))));
        assert_eq!(buckets(&plan).len(), 2);
        assert!(buckets(&plan).iter().all(|b| b.member_count_at_start == 0));
    }

    #[test]
    fn test_part_without_member_plans_nothing() {
        let event: DataUnionEvent = MemberParted {
            union_address: address('a'),
            member_address: address('1'),
            block_timestamp: 100,
        }
        .into();
        let reads = ReadSet {
            union: Some(DataUnion::new(address('a'), None)),
            ..Default::default()
        };

        let err = plan(&event, &reads, &StatsConfig::default()).unwrap_err();
        assert!(matches!(err, StatsError::MemberNotFound { .. }));
    }

    #[test]
    fn test_part_marks_inactive() {
        let event: DataUnionEvent = MemberParted {
            union_address: address('a'),
            member_address: address('1'),
            block_timestamp: 3700,
        }
        .into();
        let mut union = DataUnion::new(address('a'), None);
        union.member_count = 1;
        let reads = ReadSet {
            union: Some(union),
            member: Some(Member::joined(address('1'), address('a'), 100)),
            ..Default::default()
        };

        let plan = plan(&event, &reads, &StatsConfig::default()).unwrap();
        match plan.writes.iter().next().unwrap() {
            Record::Member(m) => {
                assert_eq!(m.status, MemberStatus::Inactive);
                assert_eq!(m.join_date, 100);
            }
            other => panic!("unexpected first write {:?}", other),
        }

        let hour = buckets(&plan)[0];
        assert_eq!(hour.id, "HOUR-3600");
        assert_eq!(hour.member_count_at_start, 1);
        assert_eq!(hour.member_count_change, -1);
    }

    #[test]
    fn test_existing_bucket_reused_and_last_writer_recorded() {
        let config = StatsConfig::default();
        let window = resolver::resolve(BucketKind::Hour, 100, BucketScope::Global, &address('b'));
        let mut existing = materialize_bucket(None, &window, &address('b'), &UnionTotals::default());
        existing.member_count_change = 5;

        let mut reads = ReadSet::default();
        reads.buckets.insert(existing.id.clone(), existing);

        let plan = plan(&joined(200), &reads, &config).unwrap();
        let hour = buckets(&plan)[0];
        assert_eq!(hour.member_count_change, 6);
        assert_eq!(hour.data_union, address('a'));
    }

    #[test]
    fn test_revenue_writes_audit_record() {
        let event: DataUnionEvent = RevenueReceived {
            union_address: address('a'),
            amount_wei: Wei::from(100u64),
            block_timestamp: 200,
            block_number: 9,
            transaction_index: 11,
            log_index: 0,
        }
        .into();

        let plan = plan(&event, &ReadSet::default(), &StatsConfig::default()).unwrap();
        let revenue = plan
            .writes
            .iter()
            .find_map(|r| match r {
                Record::RevenueEvent(e) => Some(e),
                _ => None,
            })
            .unwrap();

        assert_eq!(revenue.id, format!("{}-9-0xb-0", address('a')));
        assert_eq!(revenue.amount_wei, Wei::from(100u64));
        assert_eq!(revenue.date, 200);
        assert!(buckets(&plan).iter().all(|b| b.revenue_change_wei == Wei::from(100u64)));
    }

    #[test]
    fn test_created_is_idempotent() {
        let event: DataUnionEvent = DataUnionCreated {
            union_address: address('a'),
            block_timestamp: 5,
        }
        .into();

        let fresh = plan(&event, &ReadSet::default(), &StatsConfig::default()).unwrap();
        assert_eq!(fresh.writes.len(), 1);

        let reads = ReadSet {
            union: Some(DataUnion::new(address('a'), Some(1))),
            ..Default::default()
        };
        let existing = plan(&event, &reads, &StatsConfig::default()).unwrap();
        assert!(existing.writes.is_empty());
    }

    #[test]
    fn test_read_keys() {
        let config = StatsConfig::default().with_bucket_scope(BucketScope::PerUnion);
        let event: DataUnionEvent = MemberParted {
            union_address: address('a'),
            member_address: address('1'),
            block_timestamp: 90_000,
        }
        .into();

        let keys = read_keys(&event, &config);
        assert_eq!(keys.union, address('a'));
        assert_eq!(keys.member, Some(member_id(&address('1'), &address('a'))));
        let bucket_keys: Vec<String> = keys.buckets.iter().map(|w| w.key.clone()).collect();
        assert_eq!(
            bucket_keys,
            vec![
                format!("HOUR-{}-86400", address('a')),
                format!("DAY-{}-86400", address('a')),
            ]
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let reads = ReadSet {
            union: Some(DataUnion::new(address('a'), None)),
            ..Default::default()
        };
        let first = plan(&joined(100), &reads, &StatsConfig::default()).unwrap();
        let second = plan(&joined(100), &reads, &StatsConfig::default()).unwrap();
        assert_eq!(first, second);
    }
}
