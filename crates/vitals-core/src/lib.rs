//! # vitals-core - Shared Vitals Telemetry Types
//!
//! Wire types, fault variants, the sample generator, and the outbound sink
//! abstraction shared by the simulator and the ingestion service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      vitals-core                         │
//! │                                                          │
//! │  ┌────────────┐   ┌─────────────┐   ┌────────────────┐  │
//! │  │  fault     │──▶│  generator  │──▶│  sample        │  │
//! │  │  (overlay  │   │  (uniform   │   │  (wire format) │  │
//! │  │  variants) │   │   draws)    │   │                │  │
//! │  └────────────┘   └─────────────┘   └───────┬────────┘  │
//! │                                             │           │
//! │                    ┌────────────────────────▼────────┐  │
//! │                    │  sink (MessageSink)             │  │
//! │                    │  ├── ChannelSink (in-process)   │  │
//! │                    │  ├── LogSink (debug)            │  │
//! │                    │  └── HttpSink (batch + retry)   │  │
//! │                    └─────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Design Principles
//!
//! 1. **Pure generation** - `generator::generate` has no side effects beyond
//!    the rng draw, so the full range table is testable with a seeded rng.
//!
//! 2. **One wire contract** - every sink and store speaks the same
//!    `VitalSigns` JSON shape (camelCase, "sys/dia" blood pressure,
//!    millisecond ISO-8601 timestamps).
//!
//! 3. **Keyed ordering** - sinks preserve per-patient emission order; nothing
//!    here promises cross-patient ordering.

pub mod fault;
pub mod forward;
pub mod generator;
pub mod sample;
pub mod sink;

// Re-exports for convenience
pub use fault::{FaultVariant, UnknownVariant};
pub use forward::{DEFAULT_INGEST_URL, ForwarderConfig, ForwarderStats, HttpSink};
pub use generator::{VitalRanges, generate};
pub use sample::{BloodPressure, ParseBloodPressureError, VitalSigns, timestamp_format};
pub use sink::{ChannelSink, LogSink, MessageSink, SinkError};
