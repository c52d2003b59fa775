//! Outbound Message Sink
//!
//! Abstraction over the event bus between the simulator and the ingestion
//! service. Publishes are keyed by entity id; implementations must preserve
//! per-key emission order for any single downstream consumer.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::sample::VitalSigns;

#[derive(Debug, Error)]
pub enum SinkError {
    /// Bounded queue is full; the sample was not accepted
    #[error("sink queue full")]
    Backpressure,
    /// Receiving side is gone
    #[error("sink closed")]
    Closed,
    /// Transport-level failure reported by the underlying client
    #[error("sink transport error: {0}")]
    Transport(String),
}

/// Keyed publish onto the outbound bus
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn publish(&self, key: &str, sample: &VitalSigns) -> Result<(), SinkError>;
}

/// In-process sink over a tokio channel.
///
/// The bus used by tests and embedded single-process wiring. A single FIFO
/// carries all keys, so per-key order is order of arrival.
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<VitalSigns>,
}

impl ChannelSink {
    /// Create a sink plus its receiving half with a bounded queue
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<VitalSigns>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MessageSink for ChannelSink {
    async fn publish(&self, _key: &str, sample: &VitalSigns) -> Result<(), SinkError> {
        self.tx
            .send(sample.clone())
            .await
            .map_err(|_| SinkError::Closed)
    }
}

/// Sink that records forwards at debug level.
///
/// Stands in for the downstream topic when no endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn publish(&self, key: &str, sample: &VitalSigns) -> Result<(), SinkError> {
        debug!(key, anomaly = sample.is_anomaly, "sample forwarded to log sink");
        Ok(())
    }
}
