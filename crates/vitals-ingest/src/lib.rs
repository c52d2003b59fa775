//! # vitals-ingest - Vitals Ingestion Service
//!
//! Consumes wire-format samples, validates them against the patient
//! directory, and runs the best-effort persistence pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       vitals-ingest                        │
//! │                                                            │
//! │  POST /ingest ──▶ ShardRouter ──▶ worker[xxh3(id) % N]    │
//! │                                        │                   │
//! │                              IngestionPipeline             │
//! │                    validate → persist → cache              │
//! │                             → notify → forward             │
//! │                        │        │       │      │           │
//! │                 PatientDir  Durable  Cache  Broadcast /    │
//! │                             Store    Store  MessageSink    │
//! │                                                            │
//! │  GET /vitals/{id}/... ──▶ cache + durable store reads     │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation is the only gating stage; persist, cache, notify and forward
//! are independent, and a failure in one is logged and counted without
//! blocking the others. Per-patient ordering holds because one patient
//! always lands on the same shard worker.

pub mod api;
pub mod config;
pub mod metrics;
pub mod notify;
pub mod patients;
pub mod pipeline;
pub mod record;
pub mod service;
pub mod store;

pub use api::{AppState, router};
pub use config::IngestConfig;
pub use notify::{BroadcastChannel, NotificationChannel, NotifyError, UPDATES_CHANNEL};
pub use patients::{MemoryPatientDirectory, Patient, PatientDirectory, PatientStatus};
pub use pipeline::{IngestionPipeline, PipelineOutcome, Stage, StageReport, StageStatus};
pub use record::{PipelineRecord, ValidationStatus};
pub use service::ShardRouter;
pub use store::{
    CacheConfig, CacheStore, DurableStore, MemoryCacheStore, MemoryDurableStore, StoreError,
};
