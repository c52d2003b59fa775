//! Monitor Registry
//!
//! Owned map of patient id → live monitor handle. Entry-level locking gives
//! the scheduler its per-key atomicity: concurrent start/stop/inject calls
//! for one patient never interleave into an inconsistent handle, while
//! operations on different patients stay independent.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio_util::sync::CancellationToken;

use crate::overlay::FaultOverlay;

/// Live monitoring state for one patient.
///
/// Cheap to clone: the overlay and the cancellation token are shared with
/// the patient's recurring task and any pending expiries.
#[derive(Clone)]
pub struct MonitorHandle {
    pub patient_id: String,
    pub overlay: Arc<FaultOverlay>,
    pub cancel: CancellationToken,
}

impl MonitorHandle {
    fn new(patient_id: &str) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            overlay: Arc::new(FaultOverlay::new()),
            cancel: CancellationToken::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RegistryStats {
    pub started: AtomicU64,
    pub stopped: AtomicU64,
    pub injections: AtomicU64,
    pub expiries: AtomicU64,
}

/// Owned patient → handle map
#[derive(Default)]
pub struct MonitorRegistry {
    monitors: DashMap<String, MonitorHandle>,
    stats: RegistryStats,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh handle unless the patient is already monitored.
    /// Returns the new handle, or None when one already exists.
    pub fn insert_if_absent(&self, patient_id: &str) -> Option<MonitorHandle> {
        match self.monitors.entry(patient_id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let handle = MonitorHandle::new(patient_id);
                slot.insert(handle.clone());
                self.stats.started.fetch_add(1, Ordering::Relaxed);
                Some(handle)
            }
        }
    }

    /// Remove and return the handle, if present
    pub fn remove(&self, patient_id: &str) -> Option<MonitorHandle> {
        let removed = self.monitors.remove(patient_id).map(|(_, handle)| handle);
        if removed.is_some() {
            self.stats.stopped.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    pub fn get(&self, patient_id: &str) -> Option<MonitorHandle> {
        self.monitors
            .get(patient_id)
            .map(|entry| entry.value().clone())
    }

    pub fn contains(&self, patient_id: &str) -> bool {
        self.monitors.contains_key(patient_id)
    }

    /// Snapshot of monitored patient ids
    pub fn active_ids(&self) -> Vec<String> {
        self.monitors
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    pub fn record_injection(&self) {
        self.stats.injections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expiry(&self) {
        self.stats.expiries.fetch_add(1, Ordering::Relaxed);
    }

    /// Cancel every live monitor and clear the map. Returns how many were
    /// cancelled.
    pub fn cancel_all(&self) -> usize {
        let handles: Vec<MonitorHandle> = self
            .monitors
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for handle in &handles {
            handle.cancel.cancel();
        }
        self.monitors.clear();
        handles.len()
    }
}
