//! Fault Variants
//!
//! Closed set of injectable anomaly overlays for a monitored patient.
//! NORMAL is the default and the state an expired fault reverts to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultVariant {
    #[default]
    Normal,
    HighHeartRate,
    LowHeartRate,
    LowOxygen,
    HighTemperature,
    HighBloodPressure,
    CriticalMulti,
}

impl FaultVariant {
    /// All variants, in declaration order
    pub const ALL: [FaultVariant; 7] = [
        FaultVariant::Normal,
        FaultVariant::HighHeartRate,
        FaultVariant::LowHeartRate,
        FaultVariant::LowOxygen,
        FaultVariant::HighTemperature,
        FaultVariant::HighBloodPressure,
        FaultVariant::CriticalMulti,
    ];

    /// Every variant except NORMAL flags its samples as anomalous
    pub fn is_anomalous(self) -> bool {
        self != FaultVariant::Normal
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultVariant::Normal => "NORMAL",
            FaultVariant::HighHeartRate => "HIGH_HEART_RATE",
            FaultVariant::LowHeartRate => "LOW_HEART_RATE",
            FaultVariant::LowOxygen => "LOW_OXYGEN",
            FaultVariant::HighTemperature => "HIGH_TEMPERATURE",
            FaultVariant::HighBloodPressure => "HIGH_BLOOD_PRESSURE",
            FaultVariant::CriticalMulti => "CRITICAL_MULTI",
        }
    }
}

impl fmt::Display for FaultVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown fault variant {0:?}")]
pub struct UnknownVariant(pub String);

impl FromStr for FaultVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaultVariant::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}
