// Copyright (c) 2025 - Cowboy AI, Inc.
//! Decoded Chain Events
//!
//! Typed records for the logs emitted by data union contracts. The delivery
//! mechanism decodes one raw log into a [`DataUnionEvent`] and hands it to
//! the projection, one at a time, in block order.
//!
//! # Ordering Precondition
//!
//! Events for the same union must arrive with non-decreasing
//! `block_timestamp`. The bucket baseline snapshot is only meaningful under
//! this ordering; the projection does not re-derive or repair it.

pub mod dataunion;

pub use dataunion::{
    DataUnionCreated, DataUnionEvent, MemberJoined, MemberParted, RevenueReceived, MAX_BLOCK_TIMESTAMP,
};
