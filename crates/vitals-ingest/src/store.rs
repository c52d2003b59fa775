//! Store Contracts
//!
//! Async contracts for the durable time-series store and the latest-value
//! cache, plus the in-memory implementations used by tests and the
//! self-contained deployment. The durable store is keyed by patient with the
//! capture timestamp as the ordering dimension, so [patient, time-window]
//! range queries are the native read path.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

use vitals_core::VitalSigns;

use crate::record::PipelineRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn insert(&self, record: &PipelineRecord) -> Result<(), StoreError>;

    /// Records for one patient within [from, to], newest first
    async fn history(
        &self,
        patient_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PipelineRecord>, StoreError>;

    /// Most recent record for the patient
    async fn latest(&self, patient_id: &str) -> Result<Option<PipelineRecord>, StoreError>;

    /// All anomaly-flagged records for the patient, newest first
    async fn anomalies(&self, patient_id: &str) -> Result<Vec<PipelineRecord>, StoreError>;
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Best-effort latest-value write with the configured TTL
    async fn put_latest(&self, patient_id: &str, sample: &VitalSigns) -> Result<(), StoreError>;

    /// Latest cached sample, or None on miss/expiry
    async fn get_latest(&self, patient_id: &str) -> Result<Option<VitalSigns>, StoreError>;
}

// ============================================================================
// In-memory durable store
// ============================================================================

/// Per-patient time index. Records are keyed by (timestamp, record id) so
/// same-instant samples never collide.
type TimeIndex = BTreeMap<(DateTime<Utc>, String), PipelineRecord>;

#[derive(Default)]
pub struct MemoryDurableStore {
    series: RwLock<HashMap<String, TimeIndex>>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn insert(&self, record: &PipelineRecord) -> Result<(), StoreError> {
        let mut series = self.series.write().await;
        series
            .entry(record.patient_id.clone())
            .or_default()
            .insert((record.timestamp, record.record_id.clone()), record.clone());
        Ok(())
    }

    async fn history(
        &self,
        patient_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PipelineRecord>, StoreError> {
        let series = self.series.read().await;
        let Some(index) = series.get(patient_id) else {
            return Ok(Vec::new());
        };

        let mut records: Vec<PipelineRecord> = index
            .range((from, String::new())..)
            .take_while(|((ts, _), _)| *ts <= to)
            .map(|(_, record)| record.clone())
            .collect();
        records.reverse();
        Ok(records)
    }

    async fn latest(&self, patient_id: &str) -> Result<Option<PipelineRecord>, StoreError> {
        let series = self.series.read().await;
        Ok(series
            .get(patient_id)
            .and_then(|index| index.values().next_back().cloned()))
    }

    async fn anomalies(&self, patient_id: &str) -> Result<Vec<PipelineRecord>, StoreError> {
        let series = self.series.read().await;
        let Some(index) = series.get(patient_id) else {
            return Ok(Vec::new());
        };

        Ok(index
            .values()
            .rev()
            .filter(|record| record.is_anomaly)
            .cloned()
            .collect())
    }
}

// ============================================================================
// In-memory latest-value cache
// ============================================================================

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Prefix for cache keys, `{prefix}{patientId}:latest`
    pub prefix: String,
    /// How long a cached latest value stays readable
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: "vitals:".to_string(),
            ttl: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    pub fn key(&self, patient_id: &str) -> String {
        format!("{}{}:latest", self.prefix, patient_id)
    }
}

struct CacheEntry {
    expires_at: Instant,
    payload: String,
}

/// TTL-checked map holding JSON-serialized samples, mirroring what a
/// key-value cache would store under the same keys.
pub struct MemoryCacheStore {
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn put_latest(&self, patient_id: &str, sample: &VitalSigns) -> Result<(), StoreError> {
        let payload = serde_json::to_string(sample)?;
        let mut entries = self.entries.write().await;
        entries.insert(
            self.config.key(patient_id),
            CacheEntry {
                expires_at: Instant::now() + self.config.ttl,
                payload,
            },
        );
        Ok(())
    }

    async fn get_latest(&self, patient_id: &str) -> Result<Option<VitalSigns>, StoreError> {
        let entries = self.entries.read().await;
        let Some(entry) = entries.get(&self.config.key(patient_id)) else {
            return Ok(None);
        };
        if Instant::now() >= entry.expires_at {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&entry.payload)?))
    }
}
