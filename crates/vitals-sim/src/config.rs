//! Simulator Configuration

use std::time::Duration;

/// Tuning for the scheduler's recurring cycles and fault expiry
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Lower bound of the jittered cycle interval in milliseconds
    pub interval_min_ms: u64,
    /// Upper bound of the jittered cycle interval in milliseconds
    pub interval_max_ms: u64,
    /// How long an injected fault stays active without a newer injection
    pub fault_expiry: Duration,
}

impl SimulatorConfig {
    /// Jitter bounds as an ordered (min, max) pair.
    ///
    /// A reversed pair (operator passed min > max) is treated as its ordered
    /// form rather than panicking on an empty range draw.
    pub fn jitter_bounds(&self) -> (u64, u64) {
        if self.interval_min_ms <= self.interval_max_ms {
            (self.interval_min_ms, self.interval_max_ms)
        } else {
            (self.interval_max_ms, self.interval_min_ms)
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            interval_min_ms: 2000,
            interval_max_ms: 5000,
            fault_expiry: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = SimulatorConfig::default();
        assert!(config.interval_min_ms <= config.interval_max_ms);
        assert_eq!(config.fault_expiry, Duration::from_secs(30));
    }

    #[test]
    fn test_reversed_jitter_bounds_are_ordered() {
        let config = SimulatorConfig {
            interval_min_ms: 5000,
            interval_max_ms: 2000,
            fault_expiry: Duration::from_secs(30),
        };
        assert_eq!(config.jitter_bounds(), (2000, 5000));
        assert_eq!(SimulatorConfig::default().jitter_bounds(), (2000, 5000));
    }
}
