//! HTTP Control API for the Simulator
//!
//! Thin adapter over the scheduler contract:
//! - `POST /simulator/start/{patientId}` / `POST /simulator/stop/{patientId}`
//! - `POST /simulator/inject/{patientId}?type=VARIANT`
//! - `GET /simulator/active`
//! - `GET /health`, `GET /metrics`
//!
//! Operator misuse (stop/inject on an unmonitored patient) surfaces as a
//! 404; an unknown fault variant as a 400.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};

use vitals_core::FaultVariant;

use crate::scheduler::{SchedulerError, SimulationScheduler};

#[derive(Clone)]
pub struct ApiState {
    pub scheduler: Arc<SimulationScheduler>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    pub patient_id: String,
    pub status: String,
    pub message: String,
}

impl ControlResponse {
    fn new(patient_id: &str, status: &str, message: String) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            status: status.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveResponse {
    pub count: usize,
    pub patients: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InjectParams {
    /// Fault variant wire name; defaults to HIGH_HEART_RATE
    #[serde(rename = "type")]
    pub fault_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/simulator/start/{patient_id}", post(start_monitor))
        .route("/simulator/stop/{patient_id}", post(stop_monitor))
        .route("/simulator/inject/{patient_id}", post(inject_fault))
        .route("/simulator/active", get(active_monitors))
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn start_monitor(
    State(state): State<ApiState>,
    Path(patient_id): Path<String>,
) -> (StatusCode, Json<ControlResponse>) {
    let response = if state.scheduler.start(&patient_id) {
        ControlResponse::new(
            &patient_id,
            "started",
            format!("monitoring started for {patient_id}"),
        )
    } else {
        ControlResponse::new(
            &patient_id,
            "already_running",
            format!("{patient_id} is already monitored"),
        )
    };
    (StatusCode::OK, Json(response))
}

async fn stop_monitor(
    State(state): State<ApiState>,
    Path(patient_id): Path<String>,
) -> (StatusCode, Json<ControlResponse>) {
    if state.scheduler.stop(&patient_id) {
        (
            StatusCode::OK,
            Json(ControlResponse::new(
                &patient_id,
                "stopped",
                format!("monitoring stopped for {patient_id}"),
            )),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ControlResponse::new(
                &patient_id,
                "not_running",
                format!("{patient_id} is not monitored"),
            )),
        )
    }
}

async fn inject_fault(
    State(state): State<ApiState>,
    Path(patient_id): Path<String>,
    Query(params): Query<InjectParams>,
) -> (StatusCode, Json<ControlResponse>) {
    let variant = match params.fault_type.as_deref() {
        None => FaultVariant::HighHeartRate,
        Some(name) => match FaultVariant::from_str(name) {
            Ok(variant) => variant,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ControlResponse::new(&patient_id, "invalid_type", e.to_string())),
                );
            }
        },
    };

    match state.scheduler.inject_fault(&patient_id, variant) {
        Ok(_) => (
            StatusCode::OK,
            Json(ControlResponse::new(
                &patient_id,
                "anomaly_injected",
                format!("{variant} injected for {patient_id}"),
            )),
        ),
        Err(e @ SchedulerError::NotMonitored(_)) => (
            StatusCode::NOT_FOUND,
            Json(ControlResponse::new(&patient_id, "not_running", e.to_string())),
        ),
    }
}

async fn active_monitors(State(state): State<ApiState>) -> Json<ActiveResponse> {
    let mut patients = state.scheduler.active();
    patients.sort();
    Json(ActiveResponse {
        count: patients.len(),
        patients,
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        service: "vitals-sim",
    })
}

async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
