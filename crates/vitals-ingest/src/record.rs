//! Pipeline Record
//!
//! The persisted document derived from one inbound sample plus ingestion
//! metadata. Created once per sample and never mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vitals_core::{BloodPressure, VitalSigns, timestamp_format};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRecord {
    pub record_id: String,
    pub patient_id: String,
    pub heart_rate: u16,
    pub blood_pressure: BloodPressure,
    pub oxygen_level: u8,
    pub temperature: f64,
    /// Capture instant, the ordering dimension for range queries
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub is_anomaly: bool,
    #[serde(with = "timestamp_format")]
    pub ingested_at: DateTime<Utc>,
    pub status: ValidationStatus,
}

impl PipelineRecord {
    /// Project back to the wire-format sample, dropping ingestion metadata.
    /// Query responses use this so cached and persisted reads share a shape.
    pub fn to_sample(&self) -> VitalSigns {
        VitalSigns {
            patient_id: self.patient_id.clone(),
            heart_rate: self.heart_rate,
            blood_pressure: self.blood_pressure,
            oxygen_level: self.oxygen_level,
            temperature: self.temperature,
            timestamp: self.timestamp,
            device_id: self.device_id.clone(),
            is_anomaly: self.is_anomaly,
        }
    }

    pub fn from_sample(sample: &VitalSigns, status: ValidationStatus) -> Self {
        Self {
            record_id: Uuid::new_v4().to_string(),
            patient_id: sample.patient_id.clone(),
            heart_rate: sample.heart_rate,
            blood_pressure: sample.blood_pressure,
            oxygen_level: sample.oxygen_level,
            temperature: sample.temperature,
            timestamp: sample.timestamp,
            device_id: sample.device_id.clone(),
            is_anomaly: sample.is_anomaly,
            ingested_at: Utc::now(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> VitalSigns {
        VitalSigns {
            patient_id: "P001".to_string(),
            heart_rate: 130,
            blood_pressure: BloodPressure::new(150, 95),
            oxygen_level: 84,
            temperature: 37.4,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            device_id: "DEVICE-P001".to_string(),
            is_anomaly: true,
        }
    }

    #[test]
    fn test_from_sample_copies_fields() {
        let sample = sample();
        let record = PipelineRecord::from_sample(&sample, ValidationStatus::Valid);

        assert_eq!(record.patient_id, "P001");
        assert_eq!(record.heart_rate, 130);
        assert_eq!(record.blood_pressure, sample.blood_pressure);
        assert_eq!(record.timestamp, sample.timestamp);
        assert!(record.is_anomaly);
        assert!(record.ingested_at >= sample.timestamp);
        assert!(!record.record_id.is_empty());
    }

    #[test]
    fn test_records_get_distinct_ids() {
        let sample = sample();
        let a = PipelineRecord::from_sample(&sample, ValidationStatus::Valid);
        let b = PipelineRecord::from_sample(&sample, ValidationStatus::Valid);
        assert_ne!(a.record_id, b.record_id);
    }

    #[test]
    fn test_to_sample_round_trips_wire_fields() {
        let sample = sample();
        let record = PipelineRecord::from_sample(&sample, ValidationStatus::Valid);
        assert_eq!(record.to_sample(), sample);
    }

    #[test]
    fn test_status_wire_names() {
        let record = PipelineRecord::from_sample(&sample(), ValidationStatus::Valid);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "VALID");
        assert_eq!(value["patientId"], "P001");
        assert_eq!(value["bloodPressure"], "150/95");
    }
}
