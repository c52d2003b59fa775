//! Sharded Ingest Workers
//!
//! Inbound samples are routed to a fixed set of worker tasks by
//! xxh3(patientId) % N over bounded queues. Each worker runs the pipeline
//! sequentially, so one patient's stream is processed in arrival order while
//! different patients proceed concurrently. A full queue drops the sample
//! and counts it; the caller sees backpressure.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};
use xxhash_rust::xxh3::xxh3_64;

use vitals_core::VitalSigns;

use crate::metrics;
use crate::pipeline::IngestionPipeline;

pub struct ShardRouter {
    shard_txs: Vec<mpsc::Sender<VitalSigns>>,
}

impl ShardRouter {
    /// Spawn `shards` worker tasks, each draining its own bounded queue
    pub fn spawn(pipeline: Arc<IngestionPipeline>, shards: usize, queue_capacity: usize) -> Self {
        assert!(shards > 0, "shard count must be positive");

        let mut shard_txs = Vec::with_capacity(shards);
        for shard in 0..shards {
            let (tx, mut rx) = mpsc::channel::<VitalSigns>(queue_capacity);
            shard_txs.push(tx);

            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                info!(shard, "ingest worker active");
                while let Some(sample) = rx.recv().await {
                    let timer = metrics::PROCESS_LATENCY.start_timer();
                    pipeline.process(&sample).await;
                    timer.observe_duration();
                }
                info!(shard, "ingest worker stopped");
            });
        }

        Self { shard_txs }
    }

    pub fn shard_for(&self, patient_id: &str) -> usize {
        (xxh3_64(patient_id.as_bytes()) as usize) % self.shard_txs.len()
    }

    /// Enqueue one sample onto its patient's shard. Returns false when the
    /// queue is full or the worker is gone; the sample is dropped either way.
    pub fn dispatch(&self, sample: VitalSigns) -> bool {
        let shard = self.shard_for(&sample.patient_id);
        match self.shard_txs[shard].try_send(sample) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(sample)) => {
                metrics::BACKPRESSURE_DROPS.inc();
                warn!(shard, patient = %sample.patient_id, "shard queue full, sample dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(sample)) => {
                metrics::BACKPRESSURE_DROPS.inc();
                warn!(shard, patient = %sample.patient_id, "shard worker gone, sample dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::BroadcastChannel;
    use crate::patients::MemoryPatientDirectory;
    use crate::store::{CacheConfig, DurableStore, MemoryCacheStore, MemoryDurableStore};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use vitals_core::{BloodPressure, LogSink};

    fn sample(patient_id: &str, seq: u16) -> VitalSigns {
        VitalSigns {
            patient_id: patient_id.to_string(),
            heart_rate: 60 + seq,
            blood_pressure: BloodPressure::new(120, 80),
            oxygen_level: 98,
            temperature: 36.8,
            timestamp: Utc
                .with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
                .unwrap()
                .checked_add_signed(chrono::Duration::seconds(seq as i64))
                .unwrap(),
            device_id: format!("DEVICE-{patient_id}"),
            is_anomaly: false,
        }
    }

    fn router_with_store(shards: usize) -> (ShardRouter, Arc<MemoryDurableStore>) {
        let durable = Arc::new(MemoryDurableStore::new());
        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::new(MemoryPatientDirectory::with_demo_roster()),
            durable.clone(),
            Arc::new(MemoryCacheStore::new(CacheConfig::default())),
            Arc::new(BroadcastChannel::new(16)),
            Arc::new(LogSink),
        ));
        (ShardRouter::spawn(pipeline, shards, 256), durable)
    }

    #[test]
    fn test_routing_is_deterministic_per_patient() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let _guard = runtime.enter();
        let (router, _) = router_with_store(4);

        for patient_id in ["P001", "P002", "P003", "WARD-7-BED-12"] {
            let first = router.shard_for(patient_id);
            for _ in 0..10 {
                assert_eq!(router.shard_for(patient_id), first);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_per_patient_order_is_preserved() {
        let (router, durable) = router_with_store(4);

        let count = 20u16;
        for seq in 0..count {
            assert!(router.dispatch(sample("P001", seq)));
        }

        // Wait for the shard worker to drain its queue
        let mut records = Vec::new();
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            records = durable
                .history(
                    "P001",
                    Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
                    Utc::now(),
                )
                .await
                .unwrap();
            if records.len() == count as usize {
                break;
            }
        }

        assert_eq!(records.len(), count as usize);
        // history is newest first; ingestion order shows up reversed
        for (i, record) in records.iter().rev().enumerate() {
            assert_eq!(record.heart_rate, 60 + i as u16);
        }
    }

    #[tokio::test]
    async fn test_full_queue_reports_backpressure() {
        let durable = Arc::new(MemoryDurableStore::new());
        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::new(MemoryPatientDirectory::with_demo_roster()),
            durable,
            Arc::new(MemoryCacheStore::new(CacheConfig::default())),
            Arc::new(BroadcastChannel::new(16)),
            Arc::new(LogSink),
        ));
        // Single shard, tiny queue, and the worker never gets to run because
        // this test holds the only thread
        let router = ShardRouter::spawn(pipeline, 1, 2);

        assert!(router.dispatch(sample("P001", 0)));
        assert!(router.dispatch(sample("P001", 1)));
        assert!(!router.dispatch(sample("P001", 2)));
    }
}
