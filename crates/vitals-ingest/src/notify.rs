//! Notification Channel
//!
//! Fan-out contract for live-update subscribers. Payloads are JSON-serialized
//! samples on the well-known `vitals:updates` channel; there is no
//! persistence and no delivery guarantee for absent subscribers.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use vitals_core::VitalSigns;

pub const UPDATES_CHANNEL: &str = "vitals:updates";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn publish(&self, sample: &VitalSigns) -> Result<(), NotifyError>;
}

/// tokio broadcast implementation of the fan-out channel
pub struct BroadcastChannel {
    tx: broadcast::Sender<String>,
}

impl BroadcastChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl NotificationChannel for BroadcastChannel {
    async fn publish(&self, sample: &VitalSigns) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(sample)?;
        // No subscribers is fine, the update is simply unobserved
        let _ = self.tx.send(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vitals_core::BloodPressure;

    fn sample() -> VitalSigns {
        VitalSigns {
            patient_id: "P001".to_string(),
            heart_rate: 72,
            blood_pressure: BloodPressure::new(120, 80),
            oxygen_level: 98,
            temperature: 36.8,
            timestamp: Utc::now(),
            device_id: "DEVICE-P001".to_string(),
            is_anomaly: false,
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_json_payload() {
        let channel = BroadcastChannel::new(16);
        let mut rx = channel.subscribe();

        channel.publish(&sample()).await.unwrap();

        let payload = rx.recv().await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["patientId"], "P001");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let channel = BroadcastChannel::new(16);
        assert_eq!(channel.subscriber_count(), 0);
        channel.publish(&sample()).await.unwrap();
    }
}
