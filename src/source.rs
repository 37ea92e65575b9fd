// Copyright (c) 2025 - Cowboy AI, Inc.
//! JetStream Event Source
//!
//! Delivers decoded data union events from a durable pull consumer into the
//! ingest queue, one message at a time, acknowledging each according to
//! what happened to it:
//!
//! | Result                          | Ack      |
//! |---------------------------------|----------|
//! | applied (with or without anomaly) | `Ack`  |
//! | payload not decodable           | `Term`   |
//! | protocol violation (fatal)      | `Term`   |
//! | stored record not decodable     | `Term`   |
//! | store / infrastructure failure  | `Nak`    |
//!
//! Messages are awaited one by one, so stream order is preserved end to end.

use async_nats::jetstream::{self, consumer::pull, consumer::PullConsumer, AckKind};
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::ProjectorConfig;
use crate::errors::{StatsError, StatsResult};
use crate::events::DataUnionEvent;
use crate::ingest::IngestHandle;
use crate::projection::ProjectionOutcome;

/// How a delivered message is acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    /// Redeliver later
    Nak,
    /// Never redeliver
    Term,
}

impl Disposition {
    fn ack_kind(self) -> AckKind {
        match self {
            Disposition::Ack => AckKind::Ack,
            Disposition::Nak => AckKind::Nak(None),
            Disposition::Term => AckKind::Term,
        }
    }
}

pub fn disposition_for(result: &StatsResult<ProjectionOutcome>) -> Disposition {
    match result {
        Ok(_) => Disposition::Ack,
        Err(StatsError::InvalidEvent(_)) | Err(StatsError::InvalidAddress(_)) => Disposition::Term,
        // Redelivery reads the same corrupt record again
        Err(StatsError::Serialization(_)) => Disposition::Term,
        Err(e) if e.is_fatal_violation() => Disposition::Term,
        Err(_) => Disposition::Nak,
    }
}

/// Running counters for the consume loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub applied: u64,
    pub anomalies: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl SourceStats {
    pub fn record(&mut self, result: &StatsResult<ProjectionOutcome>) {
        match (result, disposition_for(result)) {
            (Ok(outcome), _) => {
                self.applied += 1;
                self.anomalies += outcome.anomalies.len() as u64;
            }
            (Err(_), Disposition::Term) => self.rejected += 1,
            (Err(_), _) => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.applied + self.rejected + self.failed
    }
}

/// Get or create the stream and the durable pull consumer
pub async fn connect_consumer(
    jetstream: &jetstream::Context,
    config: &ProjectorConfig,
) -> StatsResult<PullConsumer> {
    let stream = match jetstream.get_stream(&config.stream_name).await {
        Ok(stream) => {
            info!(stream = %config.stream_name, "Found existing stream");
            stream
        }
        Err(_) => {
            info!(stream = %config.stream_name, "Stream not found, creating");
            jetstream
                .create_stream(jetstream::stream::Config {
                    name: config.stream_name.clone(),
                    subjects: config.subjects.clone(),
                    ..Default::default()
                })
                .await
                .map_err(|e| StatsError::Nats(format!("failed to create stream: {}", e)))?
        }
    };

    match stream.get_consumer::<pull::Config>(&config.consumer_name).await {
        Ok(consumer) => {
            info!(consumer = %config.consumer_name, "Found existing consumer");
            Ok(consumer)
        }
        Err(_) => {
            info!(consumer = %config.consumer_name, "Consumer not found, creating");
            stream
                .create_consumer(pull::Config {
                    durable_name: Some(config.consumer_name.clone()),
                    ack_policy: jetstream::consumer::AckPolicy::Explicit,
                    ..Default::default()
                })
                .await
                .map_err(|e| StatsError::Nats(format!("failed to create consumer: {}", e)))
        }
    }
}

/// Consume until the message stream ends
pub async fn run(consumer: PullConsumer, ingest: IngestHandle) -> StatsResult<SourceStats> {
    let messages = consumer
        .stream()
        .max_messages_per_batch(10)
        .messages()
        .await
        .map_err(|e| StatsError::Nats(format!("failed to start consuming: {}", e)))?;
    tokio::pin!(messages);

    let mut stats = SourceStats::default();

    while let Some(message) = messages.next().await {
        let msg = match message {
            Ok(msg) => msg,
            Err(e) => {
                error!("Error receiving message: {}", e);
                tokio::time::sleep(Duration::from_secs(1)).await;
                continue;
            }
        };

        debug!(subject = %msg.subject, "Received message");

        let result = match DataUnionEvent::decode(&msg.payload) {
            Ok(event) => ingest.submit(event).await,
            Err(e) => Err(e),
        };

        if matches!(result, Err(StatsError::IngestClosed)) {
            warn!("Ingest worker closed, leaving message unacknowledged");
            return Err(StatsError::IngestClosed);
        }

        match &result {
            Err(StatsError::Serialization(e)) => {
                error!(
                    subject = %msg.subject,
                    "Stored record is corrupt, event dropped; repair the KV bucket and replay: {}",
                    e
                );
            }
            Err(e) => error!(subject = %msg.subject, "Event not applied: {}", e),
            Ok(_) => {}
        }

        let disposition = disposition_for(&result);
        stats.record(&result);

        if let Err(e) = msg.ack_with(disposition.ack_kind()).await {
            error!("Failed to acknowledge message: {}", e);
        }

        if stats.total() % 100 == 0 {
            info!(
                applied = stats.applied,
                anomalies = stats.anomalies,
                rejected = stats.rejected,
                failed = stats.failed,
                "Projection statistics"
            );
        }
    }

    warn!("Message stream ended");
    Ok(stats)
}
