//! Core Vitals Types
//!
//! Wire-format types shared by the simulator and the ingestion service.
//! Serialization follows the bus contract: camelCase field names, blood
//! pressure as a single "systolic/diastolic" string, timestamps as ISO-8601
//! UTC with millisecond precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Blood Pressure
// ============================================================================

/// Systolic/diastolic pair in mmHg, serialized as "120/80"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

impl BloodPressure {
    pub fn new(systolic: u16, diastolic: u16) -> Self {
        Self {
            systolic,
            diastolic,
        }
    }
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("blood pressure must be \"systolic/diastolic\", got {0:?}")]
pub struct ParseBloodPressureError(String);

impl FromStr for BloodPressure {
    type Err = ParseBloodPressureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sys, dia) = s
            .split_once('/')
            .ok_or_else(|| ParseBloodPressureError(s.to_string()))?;
        let systolic = sys
            .trim()
            .parse()
            .map_err(|_| ParseBloodPressureError(s.to_string()))?;
        let diastolic = dia
            .trim()
            .parse()
            .map_err(|_| ParseBloodPressureError(s.to_string()))?;
        Ok(Self {
            systolic,
            diastolic,
        })
    }
}

impl Serialize for BloodPressure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BloodPressure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Timestamp Format
// ============================================================================

/// Millisecond-precision ISO-8601 UTC ("2025-03-01T09:30:00.000Z")
pub mod timestamp_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&ts.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Vital Signs Sample
// ============================================================================

/// One telemetry reading emitted by a simulated device.
///
/// Immutable once built; the anomaly flag records whether a fault overlay
/// was active at generation time. Oxygen saturation stays within [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub patient_id: String,
    pub heart_rate: u16,
    pub blood_pressure: BloodPressure,
    pub oxygen_level: u8,
    pub temperature: f64,
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub is_anomaly: bool,
}

impl VitalSigns {
    /// Device identifier derived from the patient id
    pub fn device_id_for(patient_id: &str) -> String {
        format!("DEVICE-{patient_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_at(ms: u32) -> VitalSigns {
        let timestamp = Utc
            .with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(ms as i64))
            .unwrap();
        VitalSigns {
            patient_id: "P001".to_string(),
            heart_rate: 72,
            blood_pressure: BloodPressure::new(120, 80),
            oxygen_level: 98,
            temperature: 36.8,
            timestamp,
            device_id: VitalSigns::device_id_for("P001"),
            is_anomaly: false,
        }
    }

    #[test]
    fn test_wire_format_field_names() {
        let value = serde_json::to_value(sample_at(250)).unwrap();
        assert_eq!(value["patientId"], "P001");
        assert_eq!(value["heartRate"], 72);
        assert_eq!(value["bloodPressure"], "120/80");
        assert_eq!(value["oxygenLevel"], 98);
        assert_eq!(value["temperature"], 36.8);
        assert_eq!(value["timestamp"], "2025-03-01T09:30:00.250Z");
        assert_eq!(value["deviceId"], "DEVICE-P001");
        assert_eq!(value["isAnomaly"], false);
    }

    #[test]
    fn test_round_trip() {
        let original = sample_at(0);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: VitalSigns = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_blood_pressure_parsing() {
        let bp: BloodPressure = "145/92".parse().unwrap();
        assert_eq!(bp, BloodPressure::new(145, 92));
        assert_eq!(bp.to_string(), "145/92");

        assert!("145".parse::<BloodPressure>().is_err());
        assert!("abc/92".parse::<BloodPressure>().is_err());
        assert!("145/".parse::<BloodPressure>().is_err());
    }

    #[test]
    fn test_timestamp_millisecond_precision() {
        let json = serde_json::to_string(&sample_at(7)).unwrap();
        assert!(json.contains("2025-03-01T09:30:00.007Z"), "{json}");
    }
}
