// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Records and Value Objects
//!
//! The four record kinds persisted by the projection, all keyed by string
//! identities derived from chain addresses:
//!
//! - [`DataUnion`] - running member count and lifetime revenue per union
//! - [`Member`] - membership status per `(member, union)` pair
//! - [`Bucket`] - hourly and daily change windows with a baseline snapshot
//! - [`RevenueEvent`] - append-only audit log of deposits
//!
//! Records reference each other by address string only; relationships are
//! resolved by store lookup, never by live pointers.

pub mod address;
pub mod bucket;
pub mod member;
pub mod revenue;
pub mod union;
pub mod wei;

pub use address::{Address, AddressError};
pub use bucket::{Bucket, BucketError, BucketKind, BucketScope};
pub use member::{member_id, Member, MemberStatus};
pub use revenue::{LogPosition, RevenueEvent};
pub use union::{DataUnion, StatsDelta, UnionTotals};
pub use wei::{Wei, WeiError};
