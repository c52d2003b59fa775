//! # vitals-sim - Patient Vitals Simulator
//!
//! Simulates many independent vitals devices, each emitting readings at
//! jittered intervals with an injectable fault overlay, published onto the
//! outbound bus via a `MessageSink`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      vitals-sim                          │
//! │                                                          │
//! │  ┌──────────┐   ┌───────────────────────────────────┐   │
//! │  │   api    │──▶│       SimulationScheduler          │   │
//! │  │ (axum)   │   │  start / stop / inject / active    │   │
//! │  └──────────┘   └──────┬──────────────────┬─────────┘   │
//! │                        │                  │              │
//! │              ┌─────────▼──────┐   ┌───────▼──────────┐  │
//! │              │ MonitorRegistry│   │ per-patient task  │  │
//! │              │ (per-key atomic│   │ overlay → generate│  │
//! │              │  handle map)   │   │ → sink.publish    │  │
//! │              └────────────────┘   └──────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Fault injections carry a generation counter; the one-shot auto-expiry
//! only reverts to NORMAL when its generation is still the latest, so a
//! newer injection always wins over a pending expiry.

pub mod api;
pub mod config;
pub mod metrics;
pub mod overlay;
pub mod registry;
pub mod scheduler;

pub use api::{ActiveResponse, ApiState, ControlResponse, router};
pub use config::SimulatorConfig;
pub use overlay::FaultOverlay;
pub use registry::{MonitorHandle, MonitorRegistry, RegistryStats};
pub use scheduler::{SchedulerError, SimulationScheduler};
