//! Simulation Scheduler
//!
//! One recurring monitor task per patient, driven off the shared tokio
//! worker pool. Each cycle reads the patient's fault overlay, generates a
//! sample, and publishes it keyed by patient id. Cycle delays are redrawn
//! uniformly from [min,max] every cycle; cancellation is cooperative and
//! takes effect at the next cycle boundary.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use vitals_core::{FaultVariant, MessageSink, generate};

use crate::config::SimulatorConfig;
use crate::metrics;
use crate::registry::{MonitorHandle, MonitorRegistry};

#[derive(Debug, Error, PartialEq)]
pub enum SchedulerError {
    /// The patient has no live monitor, so there is nothing to inject into
    #[error("patient {0} is not monitored")]
    NotMonitored(String),
}

/// Owns the monitor registry and drives every per-patient task
pub struct SimulationScheduler {
    registry: Arc<MonitorRegistry>,
    sink: Arc<dyn MessageSink>,
    config: SimulatorConfig,
}

impl SimulationScheduler {
    pub fn new(sink: Arc<dyn MessageSink>, config: SimulatorConfig) -> Self {
        Self {
            registry: Arc::new(MonitorRegistry::new()),
            sink,
            config,
        }
    }

    /// Begin monitoring `patient_id`. Returns false when a monitor is
    /// already live; the existing task is untouched.
    pub fn start(&self, patient_id: &str) -> bool {
        let Some(handle) = self.registry.insert_if_absent(patient_id) else {
            debug!(patient = %patient_id, "start ignored, already monitored");
            return false;
        };

        metrics::ACTIVE_MONITORS.set(self.registry.len() as f64);
        info!(patient = %patient_id, "monitor started");

        let sink = self.sink.clone();
        let config = self.config.clone();
        tokio::spawn(async move {
            Self::monitor_loop(handle, sink, config).await;
        });
        true
    }

    /// Stop monitoring `patient_id`, cancelling its task and dropping all
    /// fault state. Returns false when no monitor is live.
    pub fn stop(&self, patient_id: &str) -> bool {
        match self.registry.remove(patient_id) {
            Some(handle) => {
                handle.cancel.cancel();
                metrics::ACTIVE_MONITORS.set(self.registry.len() as f64);
                info!(patient = %patient_id, "monitor stopped");
                true
            }
            None => false,
        }
    }

    /// Snapshot of currently monitored patient ids
    pub fn active(&self) -> Vec<String> {
        self.registry.active_ids()
    }

    /// Variant the patient's next cycle will generate under
    pub fn current_variant(&self, patient_id: &str) -> Option<FaultVariant> {
        self.registry
            .get(patient_id)
            .map(|handle| handle.overlay.current())
    }

    /// Activate `variant` on a monitored patient and schedule its expiry.
    ///
    /// The expiry task reverts to NORMAL after the configured delay only if
    /// no newer injection has bumped the generation in the meantime; a later
    /// injection silently supersedes the pending revert. Returns the
    /// generation of this injection.
    pub fn inject_fault(
        &self,
        patient_id: &str,
        variant: FaultVariant,
    ) -> Result<u64, SchedulerError> {
        let handle = self
            .registry
            .get(patient_id)
            .ok_or_else(|| SchedulerError::NotMonitored(patient_id.to_string()))?;

        let generation = handle.overlay.inject(variant);
        self.registry.record_injection();
        metrics::INJECTIONS_TOTAL.inc();
        info!(patient = %patient_id, %variant, generation, "fault injected");

        let expiry = self.config.fault_expiry;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = handle.cancel.cancelled() => {}
                _ = tokio::time::sleep(expiry) => {
                    if handle.overlay.revert_if_current(generation) {
                        registry.record_expiry();
                        info!(
                            patient = %handle.patient_id,
                            generation,
                            "fault expired, reverted to NORMAL"
                        );
                    }
                }
            }
        });

        Ok(generation)
    }

    /// Cancel every monitor. Returns how many were live.
    pub fn shutdown(&self) -> usize {
        let cancelled = self.registry.cancel_all();
        metrics::ACTIVE_MONITORS.set(0.0);
        cancelled
    }

    pub fn registry(&self) -> &MonitorRegistry {
        &self.registry
    }

    async fn monitor_loop(
        handle: MonitorHandle,
        sink: Arc<dyn MessageSink>,
        config: SimulatorConfig,
    ) {
        let (min_ms, max_ms) = config.jitter_bounds();

        // First sample goes out immediately; later cycles are jittered.
        loop {
            if handle.cancel.is_cancelled() {
                break;
            }

            let variant = handle.overlay.current();
            let sample = generate(&handle.patient_id, variant, &mut rand::rng());
            match sink.publish(&handle.patient_id, &sample).await {
                Ok(()) => {
                    metrics::SAMPLES_EMITTED.inc();
                    debug!(
                        patient = %handle.patient_id,
                        %variant,
                        heart_rate = sample.heart_rate,
                        "sample emitted"
                    );
                }
                Err(e) => {
                    // A bad cycle never terminates the monitor
                    metrics::PUBLISH_FAILURES.inc();
                    warn!(patient = %handle.patient_id, error = %e, "cycle skipped, publish failed");
                }
            }

            let delay = Duration::from_millis(fastrand::u64(min_ms..=max_ms));
            tokio::select! {
                _ = handle.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        debug!(patient = %handle.patient_id, "monitor loop exited");
    }
}
