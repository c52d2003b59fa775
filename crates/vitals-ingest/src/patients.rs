//! Patient Directory
//!
//! Eligibility contract for the validation stage: a sample is accepted only
//! when its patient exists and is in ACTIVE status. The in-memory directory
//! doubles as the demo roster for self-contained deployment.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientStatus {
    Active,
    Discharged,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub ward: String,
    pub status: PatientStatus,
}

#[async_trait]
pub trait PatientDirectory: Send + Sync {
    /// Whether the patient exists and is in active status. Never mutates.
    async fn is_eligible(&self, patient_id: &str) -> Result<bool, StoreError>;
}

#[derive(Default)]
pub struct MemoryPatientDirectory {
    patients: RwLock<HashMap<String, Patient>>,
}

impl MemoryPatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo roster: P001-P003 active, P004 discharged
    pub fn with_demo_roster() -> Self {
        let mut patients = HashMap::new();
        for (id, name, ward, status) in [
            ("P001", "Alice Hart", "ICU", PatientStatus::Active),
            ("P002", "Ben Okafor", "Cardiology", PatientStatus::Active),
            ("P003", "Carla Mendes", "General", PatientStatus::Active),
            ("P004", "Dan Weiss", "General", PatientStatus::Discharged),
        ] {
            patients.insert(
                id.to_string(),
                Patient {
                    id: id.to_string(),
                    name: name.to_string(),
                    ward: ward.to_string(),
                    status,
                },
            );
        }
        Self {
            patients: RwLock::new(patients),
        }
    }

    pub async fn admit(&self, patient: Patient) {
        self.patients.write().await.insert(patient.id.clone(), patient);
    }
}

#[async_trait]
impl PatientDirectory for MemoryPatientDirectory {
    async fn is_eligible(&self, patient_id: &str) -> Result<bool, StoreError> {
        let patients = self.patients.read().await;
        Ok(patients
            .get(patient_id)
            .is_some_and(|patient| patient.status == PatientStatus::Active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_roster_eligibility() {
        let directory = MemoryPatientDirectory::with_demo_roster();

        assert!(directory.is_eligible("P001").await.unwrap());
        assert!(directory.is_eligible("P003").await.unwrap());
        // Discharged patients exist but are not eligible
        assert!(!directory.is_eligible("P004").await.unwrap());
        // Unknown patients are not eligible
        assert!(!directory.is_eligible("GHOST").await.unwrap());
    }

    #[tokio::test]
    async fn test_admit_makes_eligible() {
        let directory = MemoryPatientDirectory::new();
        assert!(!directory.is_eligible("P100").await.unwrap());

        directory
            .admit(Patient {
                id: "P100".to_string(),
                name: "Eve Stern".to_string(),
                ward: "ICU".to_string(),
                status: PatientStatus::Active,
            })
            .await;
        assert!(directory.is_eligible("P100").await.unwrap());
    }
}
