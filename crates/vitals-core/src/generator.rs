//! Vital Signs Generator
//!
//! Pure sampling of one reading per call. Every field is drawn independently
//! and uniformly from the range belonging to the active fault variant, so
//! output is fully reproducible under a seeded rng.

use chrono::Utc;
use rand::Rng;

use crate::fault::FaultVariant;
use crate::sample::{BloodPressure, VitalSigns};

/// Inclusive field ranges for one fault variant
#[derive(Debug, Clone, Copy)]
pub struct VitalRanges {
    pub heart_rate: (u16, u16),
    pub systolic: (u16, u16),
    pub diastolic: (u16, u16),
    pub oxygen: (u8, u8),
    pub temperature: (f64, f64),
}

const NORMAL_BP: ((u16, u16), (u16, u16)) = ((110, 130), (70, 85));
const HIGH_BP: ((u16, u16), (u16, u16)) = ((145, 170), (92, 110));

impl VitalRanges {
    pub fn for_variant(variant: FaultVariant) -> Self {
        let baseline = Self {
            heart_rate: (60, 100),
            systolic: NORMAL_BP.0,
            diastolic: NORMAL_BP.1,
            oxygen: (95, 100),
            temperature: (36.5, 37.5),
        };

        match variant {
            FaultVariant::Normal => baseline,
            FaultVariant::HighHeartRate => Self {
                heart_rate: (125, 150),
                ..baseline
            },
            FaultVariant::LowHeartRate => Self {
                heart_rate: (35, 48),
                ..baseline
            },
            FaultVariant::LowOxygen => Self {
                oxygen: (75, 88),
                ..baseline
            },
            FaultVariant::HighTemperature => Self {
                heart_rate: (85, 110),
                temperature: (38.6, 40.0),
                ..baseline
            },
            FaultVariant::HighBloodPressure => Self {
                heart_rate: (70, 90),
                systolic: HIGH_BP.0,
                diastolic: HIGH_BP.1,
                ..baseline
            },
            FaultVariant::CriticalMulti => Self {
                heart_rate: (140, 180),
                systolic: HIGH_BP.0,
                diastolic: HIGH_BP.1,
                oxygen: (80, 88),
                temperature: (37.0, 38.0),
            },
        }
    }

    /// Whether every numeric field of `sample` lies inside these ranges
    pub fn contains(&self, sample: &VitalSigns) -> bool {
        let (hr_lo, hr_hi) = self.heart_rate;
        let (sys_lo, sys_hi) = self.systolic;
        let (dia_lo, dia_hi) = self.diastolic;
        let (ox_lo, ox_hi) = self.oxygen;
        let (t_lo, t_hi) = self.temperature;

        (hr_lo..=hr_hi).contains(&sample.heart_rate)
            && (sys_lo..=sys_hi).contains(&sample.blood_pressure.systolic)
            && (dia_lo..=dia_hi).contains(&sample.blood_pressure.diastolic)
            && (ox_lo..=ox_hi).contains(&sample.oxygen_level)
            && (t_lo..=t_hi).contains(&sample.temperature)
    }
}

/// Generate one reading for `patient_id` under `variant`.
///
/// No side effects beyond the rng draw; the capture timestamp is the wall
/// clock at call time.
pub fn generate<R: Rng + ?Sized>(
    patient_id: &str,
    variant: FaultVariant,
    rng: &mut R,
) -> VitalSigns {
    let ranges = VitalRanges::for_variant(variant);

    VitalSigns {
        patient_id: patient_id.to_string(),
        heart_rate: rng.random_range(ranges.heart_rate.0..=ranges.heart_rate.1),
        blood_pressure: BloodPressure::new(
            rng.random_range(ranges.systolic.0..=ranges.systolic.1),
            rng.random_range(ranges.diastolic.0..=ranges.diastolic.1),
        ),
        oxygen_level: rng.random_range(ranges.oxygen.0..=ranges.oxygen.1),
        temperature: rng.random_range(ranges.temperature.0..=ranges.temperature.1),
        timestamp: Utc::now(),
        device_id: VitalSigns::device_id_for(patient_id),
        is_anomaly: variant.is_anomalous(),
    }
}
