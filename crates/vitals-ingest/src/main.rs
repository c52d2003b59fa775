//! vitals-ingest - vitals ingestion and query service
//!
//! Usage:
//!   vitals-ingest --listen 0.0.0.0:8080
//!   vitals-ingest --shards 8 --queue-capacity 8192 --cache-ttl-secs 120

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use vitals_core::LogSink;
use vitals_ingest::{
    AppState, BroadcastChannel, CacheConfig, IngestConfig, IngestionPipeline, MemoryCacheStore,
    MemoryDurableStore, MemoryPatientDirectory, ShardRouter, router,
};

#[derive(Parser)]
#[command(name = "vitals-ingest")]
#[command(about = "Vitals ingestion pipeline with cache, fan-out and query API")]
struct Cli {
    /// Address for the ingest and query API
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen: String,

    /// Number of shard workers
    #[arg(long, default_value_t = 4)]
    shards: usize,

    /// Bounded queue depth per shard worker
    #[arg(long, default_value_t = 4096)]
    queue_capacity: usize,

    /// TTL for cached latest values
    #[arg(long, default_value_t = 300)]
    cache_ttl_secs: u64,

    /// Prefix for cache keys
    #[arg(long, default_value = "vitals:")]
    cache_prefix: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = IngestConfig {
        shards: cli.shards,
        queue_capacity: cli.queue_capacity,
        cache: CacheConfig {
            prefix: cli.cache_prefix.clone(),
            ttl: Duration::from_secs(cli.cache_ttl_secs),
        },
    };

    let patients = Arc::new(MemoryPatientDirectory::with_demo_roster());
    let durable = Arc::new(MemoryDurableStore::new());
    let cache = Arc::new(MemoryCacheStore::new(config.cache.clone()));
    let notifier = Arc::new(BroadcastChannel::new(1024));

    // The downstream topic has no consumer in the self-contained deployment
    let pipeline = Arc::new(IngestionPipeline::new(
        patients,
        durable.clone(),
        cache.clone(),
        notifier,
        Arc::new(LogSink),
    ));
    let shard_router = Arc::new(ShardRouter::spawn(
        pipeline,
        config.shards,
        config.queue_capacity,
    ));
    info!(shards = config.shards, "ingest workers started, demo roster seeded");

    let app = router(AppState {
        router: shard_router,
        durable,
        cache,
    });

    let listener = TcpListener::bind(&cli.listen)
        .await
        .expect("failed to bind ingest port");
    info!(addr = %cli.listen, "ingest service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutting down, draining shard queues");
        })
        .await
        .expect("server crashed");
}
