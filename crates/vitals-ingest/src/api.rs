//! Ingest + Query HTTP API
//!
//! Ingest endpoints accept wire-format samples (single or batch), parsed
//! with the simd-json extractor, and hand them to the shard router: 202 on
//! enqueue, 503 when a shard queue is full. Query endpoints read the cache
//! and the durable store; the latest read prefers the cache and falls back
//! to the most recent persisted record.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Path, Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use vitals_core::VitalSigns;

use crate::metrics;
use crate::service::ShardRouter;
use crate::store::{CacheStore, DurableStore};

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ShardRouter>,
    pub durable: Arc<dyn DurableStore>,
    pub cache: Arc<dyn CacheStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(ingest))
        .route("/ingest/batch", post(ingest_batch))
        .route("/vitals/{patient_id}/latest", get(latest))
        .route("/vitals/{patient_id}/history", get(history))
        .route("/vitals/{patient_id}/anomalies", get(anomalies))
        .route("/vitals/{patient_id}/stats", get(patient_stats))
        .route("/health", get(health))
        .route("/stats", get(service_stats))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// ============================================================================
// simd-json extractor
// ============================================================================

pub struct SimdJson<T>(pub T);

impl<S, T> FromRequest<S> for SimdJson<T>
where
    T: for<'de> Deserialize<'de>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let mut buf = bytes.to_vec();

        let value = simd_json::from_slice::<T>(&mut buf)
            .map_err(|_| (StatusCode::BAD_REQUEST, "invalid JSON").into_response())?;
        Ok(SimdJson(value))
    }
}

// ============================================================================
// Ingest handlers
// ============================================================================

async fn ingest(
    State(state): State<AppState>,
    SimdJson(sample): SimdJson<VitalSigns>,
) -> StatusCode {
    if state.router.dispatch(sample) {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn ingest_batch(
    State(state): State<AppState>,
    SimdJson(samples): SimdJson<Vec<VitalSigns>>,
) -> StatusCode {
    let mut all_accepted = true;
    for sample in samples {
        all_accepted &= state.router.dispatch(sample);
    }
    if all_accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

// ============================================================================
// Query handlers
// ============================================================================

async fn latest(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<VitalSigns>, StatusCode> {
    match state.cache.get_latest(&patient_id).await {
        Ok(Some(sample)) => return Ok(Json(sample)),
        Ok(None) => {}
        Err(e) => warn!(patient = %patient_id, error = %e, "cache read failed, falling back to store"),
    }

    // Fallback projects the persisted record back to the sample shape so
    // both paths return the same DTO
    match state.durable.latest(&patient_id).await {
        Ok(Some(record)) => Ok(Json(record.to_sample())),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

async fn history(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<crate::record::PipelineRecord>>, StatusCode> {
    let to = query.to.unwrap_or_else(Utc::now);
    let from = query.from.unwrap_or_else(|| to - chrono::Duration::hours(1));

    state
        .durable
        .history(&patient_id, from, to)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn anomalies(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<crate::record::PipelineRecord>>, StatusCode> {
    state
        .durable
        .anomalies(&patient_id)
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientStats {
    pub avg_heart_rate: f64,
    pub avg_oxygen_level: f64,
    pub anomaly_count: usize,
    pub sample_count: usize,
}

async fn patient_stats(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientStats>, StatusCode> {
    let to = Utc::now();
    let from = to - chrono::Duration::hours(24);
    let records = state
        .durable
        .history(&patient_id, from, to)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let sample_count = records.len();
    let stats = if sample_count == 0 {
        PatientStats {
            avg_heart_rate: 0.0,
            avg_oxygen_level: 0.0,
            anomaly_count: 0,
            sample_count: 0,
        }
    } else {
        PatientStats {
            avg_heart_rate: records.iter().map(|r| r.heart_rate as f64).sum::<f64>()
                / sample_count as f64,
            avg_oxygen_level: records.iter().map(|r| r.oxygen_level as f64).sum::<f64>()
                / sample_count as f64,
            anomaly_count: records.iter().filter(|r| r.is_anomaly).count(),
            sample_count,
        }
    };
    Ok(Json(stats))
}

// ============================================================================
// Service endpoints
// ============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "UP", "service": "vitals-ingest" }))
}

async fn service_stats() -> Json<serde_json::Value> {
    Json(json!({
        "ingested": metrics::INGESTED_TOTAL.get(),
        "rejected": metrics::REJECTED_TOTAL.get(),
        "stageFailures": metrics::STAGE_FAILURES.get(),
        "dropped": metrics::BACKPRESSURE_DROPS.get(),
    }))
}

async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::BroadcastChannel;
    use crate::patients::MemoryPatientDirectory;
    use crate::pipeline::IngestionPipeline;
    use crate::record::{PipelineRecord, ValidationStatus};
    use crate::store::{CacheConfig, MemoryCacheStore, MemoryDurableStore};
    use std::time::Duration;
    use vitals_core::{BloodPressure, LogSink};

    fn sample(patient_id: &str, heart_rate: u16) -> VitalSigns {
        VitalSigns {
            patient_id: patient_id.to_string(),
            heart_rate,
            blood_pressure: BloodPressure::new(120, 80),
            oxygen_level: 98,
            temperature: 36.8,
            timestamp: Utc::now(),
            device_id: format!("DEVICE-{patient_id}"),
            is_anomaly: false,
        }
    }

    fn test_state() -> (AppState, Arc<MemoryDurableStore>, Arc<MemoryCacheStore>) {
        let durable = Arc::new(MemoryDurableStore::new());
        let cache = Arc::new(MemoryCacheStore::new(CacheConfig::default()));
        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::new(MemoryPatientDirectory::with_demo_roster()),
            durable.clone(),
            cache.clone(),
            Arc::new(BroadcastChannel::new(16)),
            Arc::new(LogSink),
        ));
        let router = Arc::new(ShardRouter::spawn(pipeline, 2, 256));
        (
            AppState {
                router,
                durable: durable.clone(),
                cache: cache.clone(),
            },
            durable,
            cache,
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ingest_accepts_and_persists() {
        let (state, durable, _) = test_state();

        let code = ingest(State(state), SimdJson(sample("P001", 72))).await;
        assert_eq!(code, StatusCode::ACCEPTED);

        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if durable.latest("P001").await.unwrap().is_some() {
                return;
            }
        }
        panic!("sample was never persisted");
    }

    #[tokio::test]
    async fn test_latest_prefers_cache_then_store() {
        let (state, durable, cache) = test_state();

        // Nothing anywhere: 404
        let err = latest(State(state.clone()), Path("P001".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, StatusCode::NOT_FOUND);

        // Only the store has a record: the fallback projects it back to the
        // sample shape, without ingestion metadata
        let record = PipelineRecord::from_sample(&sample("P001", 70), ValidationStatus::Valid);
        durable.insert(&record).await.unwrap();
        let Json(body) = latest(State(state.clone()), Path("P001".to_string()))
            .await
            .unwrap();
        assert_eq!(body.heart_rate, 70);
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("recordId").is_none());
        assert!(value.get("ingestedAt").is_none());

        // Cache wins once populated
        cache.put_latest("P001", &sample("P001", 88)).await.unwrap();
        let Json(body) = latest(State(state), Path("P001".to_string()))
            .await
            .unwrap();
        assert_eq!(body.heart_rate, 88);
    }

    #[tokio::test]
    async fn test_stats_over_persisted_records() {
        let (state, durable, _) = test_state();

        for (heart_rate, is_anomaly) in [(60u16, false), (80, false), (130, true)] {
            let mut s = sample("P002", heart_rate);
            s.is_anomaly = is_anomaly;
            let record = PipelineRecord::from_sample(&s, ValidationStatus::Valid);
            durable.insert(&record).await.unwrap();
        }

        let Json(stats) = patient_stats(State(state), Path("P002".to_string()))
            .await
            .unwrap();
        assert_eq!(stats.sample_count, 3);
        assert_eq!(stats.anomaly_count, 1);
        assert!((stats.avg_heart_rate - 90.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_history_defaults_to_last_hour() {
        let (state, durable, _) = test_state();

        let mut old = sample("P003", 70);
        old.timestamp = Utc::now() - chrono::Duration::hours(2);
        durable
            .insert(&PipelineRecord::from_sample(&old, ValidationStatus::Valid))
            .await
            .unwrap();
        durable
            .insert(&PipelineRecord::from_sample(
                &sample("P003", 75),
                ValidationStatus::Valid,
            ))
            .await
            .unwrap();

        let Json(records) = history(
            State(state),
            Path("P003".to_string()),
            Query(HistoryQuery {
                from: None,
                to: None,
            }),
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heart_rate, 75);
    }
}
