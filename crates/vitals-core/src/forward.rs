//! HTTP Bus Bridge
//!
//! Ships samples from the simulator to the ingestion service over HTTP.
//! Bounded async forwarding with batching, retry and backpressure, so a slow
//! or absent ingest endpoint never blocks the monitor cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::sample::VitalSigns;
use crate::sink::{MessageSink, SinkError};

pub const DEFAULT_INGEST_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    pub ingest_url: String,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub channel_capacity: usize,
    pub timeout_ms: u64,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            ingest_url: DEFAULT_INGEST_URL.to_string(),
            batch_size: 64,
            flush_interval_ms: 500,
            max_retries: 3,
            retry_base_delay_ms: 100,
            channel_capacity: 10_000,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Default)]
pub struct ForwarderStats {
    pub sent: AtomicU64,
    pub failed: AtomicU64,
    pub retried: AtomicU64,
    pub dropped: AtomicU64,
    pub batches: AtomicU64,
}

/// MessageSink that posts sample batches to the ingest API in the background.
///
/// `publish` is non-blocking: it enqueues onto a bounded channel and reports
/// Backpressure when the queue is full. The worker preserves enqueue order,
/// which keeps per-key emission order intact end to end.
pub struct HttpSink {
    tx: mpsc::Sender<VitalSigns>,
    stats: Arc<ForwarderStats>,
}

impl HttpSink {
    pub fn new(config: ForwarderConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let stats = Arc::new(ForwarderStats::default());
        let stats_clone = stats.clone();

        tokio::spawn(async move {
            Self::worker(rx, config, stats_clone).await;
        });

        Self { tx, stats }
    }

    pub fn stats(&self) -> &ForwarderStats {
        &self.stats
    }

    async fn worker(
        mut rx: mpsc::Receiver<VitalSigns>,
        config: ForwarderConfig,
        stats: Arc<ForwarderStats>,
    ) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .pool_max_idle_per_host(4)
            .build()
            .unwrap();

        let url = format!("{}/ingest/batch", config.ingest_url);
        let mut batch: Vec<VitalSigns> = Vec::with_capacity(config.batch_size);
        let mut interval = tokio::time::interval(Duration::from_millis(config.flush_interval_ms));

        info!(url = %url, "http sink started");

        loop {
            tokio::select! {
                Some(sample) = rx.recv() => {
                    batch.push(sample);
                    if batch.len() >= config.batch_size {
                        Self::flush_batch(&client, &url, &mut batch, &config, &stats).await;
                    }
                }
                _ = interval.tick() => {
                    if !batch.is_empty() {
                        Self::flush_batch(&client, &url, &mut batch, &config, &stats).await;
                    }
                }
                else => break,
            }
        }

        if !batch.is_empty() {
            Self::flush_batch(&client, &url, &mut batch, &config, &stats).await;
        }

        info!("http sink stopped");
    }

    async fn flush_batch(
        client: &reqwest::Client,
        url: &str,
        batch: &mut Vec<VitalSigns>,
        config: &ForwarderConfig,
        stats: &ForwarderStats,
    ) {
        if batch.is_empty() {
            return;
        }

        let payload = std::mem::take(batch);
        let count = payload.len();

        for attempt in 0..=config.max_retries {
            match client.post(url).json(&payload).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        stats.sent.fetch_add(count as u64, Ordering::Relaxed);
                        stats.batches.fetch_add(1, Ordering::Relaxed);
                        debug!(count, "forwarded samples to ingest");
                        return;
                    } else if response.status() == StatusCode::SERVICE_UNAVAILABLE {
                        warn!(attempt, status = %response.status(), "ingest backpressured");
                    } else {
                        warn!(attempt, status = %response.status(), "ingest returned error");
                    }
                }
                Err(e) => {
                    warn!(attempt, error = %e, "failed to reach ingest");
                }
            }

            if attempt < config.max_retries {
                stats.retried.fetch_add(1, Ordering::Relaxed);
                let delay = config.retry_base_delay_ms * (1 << attempt);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        stats.failed.fetch_add(count as u64, Ordering::Relaxed);
        error!(count, "dropped samples after max retries");
    }
}

#[async_trait]
impl MessageSink for HttpSink {
    async fn publish(&self, key: &str, sample: &VitalSigns) -> Result<(), SinkError> {
        match self.tx.try_send(sample.clone()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(key, "http sink queue full, sample dropped");
                Err(SinkError::Backpressure)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                Err(SinkError::Closed)
            }
        }
    }
}
