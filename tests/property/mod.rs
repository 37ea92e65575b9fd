// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `bucket_identity`: time window resolution
//! - `aggregation`: totals and bucket conservation over random sequences

mod aggregation;
mod bucket_identity;
