// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration loaded from environment variables

use crate::domain::BucketScope;
use crate::errors::{StatsError, StatsResult};
use crate::ingest::IngestConfig;

/// Projection behavior
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsConfig {
    /// Whether bucket keys include the union address
    pub bucket_scope: BucketScope,
}

impl StatsConfig {
    pub fn with_bucket_scope(mut self, scope: BucketScope) -> Self {
        self.bucket_scope = scope;
        self
    }

    /// Reads `DU_BUCKET_SCOPE` (`global` | `per-union`)
    pub fn from_env() -> StatsResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> StatsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket_scope = match lookup("DU_BUCKET_SCOPE") {
            Some(value) => value
                .parse()
                .map_err(|e| StatsError::Configuration(format!("DU_BUCKET_SCOPE: {}", e)))?,
            None => BucketScope::default(),
        };

        Ok(Self { bucket_scope })
    }
}

/// Configuration for the projector service
#[derive(Debug, Clone)]
pub struct ProjectorConfig {
    /// NATS server URL
    pub nats_url: String,
    /// JetStream stream carrying decoded data union events
    pub stream_name: String,
    /// Subjects captured by the stream
    pub subjects: Vec<String>,
    /// Durable consumer name for this projector
    pub consumer_name: String,
    /// KV bucket holding the projected records
    pub kv_bucket: String,
    pub ingest: IngestConfig,
    pub stats: StatsConfig,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            nats_url: "localhost:4222".to_string(),
            stream_name: "DATAUNION_EVENTS".to_string(),
            subjects: vec!["dataunion.>".to_string()],
            consumer_name: "dataunion-projector".to_string(),
            kv_bucket: "DATAUNION_STATS".to_string(),
            ingest: IngestConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl ProjectorConfig {
    pub fn from_env() -> StatsResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> StatsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let subjects = lookup("NATS_SUBJECTS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.subjects);
        if subjects.is_empty() {
            return Err(StatsError::Configuration("NATS_SUBJECTS is empty".to_string()));
        }

        let capacity = match lookup("DU_INGEST_CAPACITY") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| StatsError::Configuration(format!("DU_INGEST_CAPACITY: invalid value {}", value)))?,
            None => defaults.ingest.capacity,
        };

        let strict_ordering = match lookup("DU_STRICT_ORDERING") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| StatsError::Configuration(format!("DU_STRICT_ORDERING: invalid value {}", value)))?,
            None => defaults.ingest.strict_ordering,
        };

        Ok(Self {
            nats_url: lookup("NATS_URL").unwrap_or(defaults.nats_url),
            stream_name: lookup("NATS_STREAM").unwrap_or(defaults.stream_name),
            subjects,
            consumer_name: lookup("NATS_CONSUMER").unwrap_or(defaults.consumer_name),
            kv_bucket: lookup("NATS_KV_BUCKET").unwrap_or(defaults.kv_bucket),
            ingest: IngestConfig {
                capacity,
                strict_ordering,
            },
            stats: StatsConfig::from_lookup(&lookup)?,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
