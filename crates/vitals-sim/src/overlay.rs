//! Anomaly Overlay
//!
//! Per-patient fault state with a generation counter. Every injection bumps
//! the generation; auto-expiry reverts to NORMAL only when its generation is
//! still current, so a newer injection silently wins over a pending expiry.
//! The counter comparison also covers back-to-back injections of the same
//! variant, which a value comparison would conflate.

use std::sync::Mutex;

use vitals_core::FaultVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OverlayState {
    variant: FaultVariant,
    generation: u64,
}

/// Shared fault state for one monitored patient
#[derive(Debug)]
pub struct FaultOverlay {
    state: Mutex<OverlayState>,
}

impl FaultOverlay {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(OverlayState {
                variant: FaultVariant::Normal,
                generation: 0,
            }),
        }
    }

    /// Variant the next cycle should generate under
    pub fn current(&self) -> FaultVariant {
        self.state.lock().unwrap().variant
    }

    /// Generation of the latest injection (0 before any injection)
    pub fn generation(&self) -> u64 {
        self.state.lock().unwrap().generation
    }

    /// Activate `variant`, returning the generation of this injection
    pub fn inject(&self, variant: FaultVariant) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.generation += 1;
        state.variant = variant;
        state.generation
    }

    /// Compare-and-reset: revert to NORMAL only if `generation` is still the
    /// latest injection. Returns whether the revert happened.
    pub fn revert_if_current(&self, generation: u64) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.generation == generation {
            state.variant = FaultVariant::Normal;
            true
        } else {
            false
        }
    }
}

impl Default for FaultOverlay {
    fn default() -> Self {
        Self::new()
    }
}
