// Copyright (c) 2025 - Cowboy AI, Inc.
//! Data Union Projector Service
//!
//! Listens to decoded data union events on NATS JetStream and projects them
//! into statistics records held in a JetStream KV bucket.
//!
//! - Events → JetStream → Consumer → Ingest queue → StatsProjection → KV
//!
//! Run with: cargo run --bin dataunion-projector
//!
//! Configuration comes from the environment (see `ProjectorConfig::from_env`):
//! NATS_URL, NATS_STREAM, NATS_SUBJECTS, NATS_CONSUMER, NATS_KV_BUCKET,
//! DU_INGEST_CAPACITY, DU_STRICT_ORDERING, DU_BUCKET_SCOPE.

use anyhow::{Context, Result};
use async_nats::jetstream;
use dataunion_stats::{
    ingest, source, KvEntityStore, ProjectionAdapter, ProjectorConfig, StatsProjection,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting data union projector");

    let config = ProjectorConfig::from_env().context("Invalid configuration")?;
    info!(
        nats_url = %config.nats_url,
        stream = %config.stream_name,
        consumer = %config.consumer_name,
        kv_bucket = %config.kv_bucket,
        bucket_scope = ?config.stats.bucket_scope,
        strict_ordering = config.ingest.strict_ordering,
        "Configuration loaded"
    );

    let client = async_nats::connect(&config.nats_url)
        .await
        .context("Failed to connect to NATS")?;
    info!("Connected to NATS");

    let jetstream = jetstream::new(client);

    let store = KvEntityStore::open(&jetstream, &config.kv_bucket)
        .await
        .context("Failed to open KV store")?;

    let mut projection = StatsProjection::new(Arc::new(store), config.stats.clone());
    projection
        .initialize()
        .await
        .context("Failed to initialize projection")?;
    info!("Projection initialized");

    let consumer = source::connect_consumer(&jetstream, &config)
        .await
        .context("Failed to set up consumer")?;

    let (handle, worker) = ingest::spawn(projection, config.ingest.clone());

    info!("Starting event consumption");
    let stats = source::run(consumer, handle)
        .await
        .context("Event consumption failed")?;

    info!(
        applied = stats.applied,
        anomalies = stats.anomalies,
        rejected = stats.rejected,
        failed = stats.failed,
        "Consumption finished"
    );

    if let Err(e) = worker.await {
        warn!("Ingest worker ended abnormally: {}", e);
    }

    Ok(())
}
