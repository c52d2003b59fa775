//! Ingestion Pipeline
//!
//! Stateless orchestrator running the ordered stages
//! validate → persist → cache → notify → forward for one inbound sample.
//! Only validation gates: an ineligible patient drops the sample before
//! anything is written. Stages 2-5 are independent best-effort steps; a
//! failure in one is logged, counted, and never blocks the others.
//!
//! Every invocation returns the full ordered stage-result list, which is
//! what makes the partial-failure contract directly testable.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use vitals_core::{MessageSink, VitalSigns};

use crate::metrics;
use crate::notify::NotificationChannel;
use crate::patients::PatientDirectory;
use crate::record::{PipelineRecord, ValidationStatus};
use crate::store::{CacheStore, DurableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validate,
    Persist,
    Cache,
    Notify,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub status: StageStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub status: ValidationStatus,
    pub stages: Vec<StageReport>,
}

impl PipelineOutcome {
    fn rejected() -> Self {
        let mut stages = vec![StageReport {
            stage: Stage::Validate,
            status: StageStatus::Failed,
        }];
        for stage in [Stage::Persist, Stage::Cache, Stage::Notify, Stage::Forward] {
            stages.push(StageReport {
                stage,
                status: StageStatus::Skipped,
            });
        }
        Self {
            status: ValidationStatus::Rejected,
            stages,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ValidationStatus::Rejected
    }

    pub fn stage_status(&self, stage: Stage) -> Option<StageStatus> {
        self.stages
            .iter()
            .find(|report| report.stage == stage)
            .map(|report| report.status)
    }
}

/// Per-sample orchestrator; owns no state, everything is delegated
pub struct IngestionPipeline {
    patients: Arc<dyn PatientDirectory>,
    durable: Arc<dyn DurableStore>,
    cache: Arc<dyn CacheStore>,
    notifier: Arc<dyn NotificationChannel>,
    downstream: Arc<dyn MessageSink>,
}

impl IngestionPipeline {
    pub fn new(
        patients: Arc<dyn PatientDirectory>,
        durable: Arc<dyn DurableStore>,
        cache: Arc<dyn CacheStore>,
        notifier: Arc<dyn NotificationChannel>,
        downstream: Arc<dyn MessageSink>,
    ) -> Self {
        Self {
            patients,
            durable,
            cache,
            notifier,
            downstream,
        }
    }

    pub async fn process(&self, sample: &VitalSigns) -> PipelineOutcome {
        // Stage 1: validate (gating)
        match self.patients.is_eligible(&sample.patient_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(patient = %sample.patient_id, "sample rejected, patient unknown or inactive");
                metrics::REJECTED_TOTAL.inc();
                return PipelineOutcome::rejected();
            }
            Err(e) => {
                error!(patient = %sample.patient_id, error = %e, "validator unavailable, sample rejected");
                metrics::REJECTED_TOTAL.inc();
                metrics::STAGE_FAILURES.inc();
                return PipelineOutcome::rejected();
            }
        }

        let mut stages = vec![StageReport {
            stage: Stage::Validate,
            status: StageStatus::Succeeded,
        }];

        // Stage 2: persist
        let record = PipelineRecord::from_sample(sample, ValidationStatus::Valid);
        let persist = match self.durable.insert(&record).await {
            Ok(()) => StageStatus::Succeeded,
            Err(e) => {
                error!(patient = %sample.patient_id, error = %e, "persist failed");
                metrics::STAGE_FAILURES.inc();
                StageStatus::Failed
            }
        };
        stages.push(StageReport {
            stage: Stage::Persist,
            status: persist,
        });

        // Stage 3: cache latest value
        let cache = match self.cache.put_latest(&sample.patient_id, sample).await {
            Ok(()) => StageStatus::Succeeded,
            Err(e) => {
                warn!(patient = %sample.patient_id, error = %e, "cache write failed, continuing");
                metrics::STAGE_FAILURES.inc();
                StageStatus::Failed
            }
        };
        stages.push(StageReport {
            stage: Stage::Cache,
            status: cache,
        });

        // Stage 4: notify live subscribers
        let notify = match self.notifier.publish(sample).await {
            Ok(()) => StageStatus::Succeeded,
            Err(e) => {
                warn!(patient = %sample.patient_id, error = %e, "notification failed, continuing");
                metrics::STAGE_FAILURES.inc();
                StageStatus::Failed
            }
        };
        stages.push(StageReport {
            stage: Stage::Notify,
            status: notify,
        });

        // Stage 5: forward downstream, no retry here
        let forward = match self.downstream.publish(&sample.patient_id, sample).await {
            Ok(()) => StageStatus::Succeeded,
            Err(e) => {
                warn!(patient = %sample.patient_id, error = %e, "downstream forward failed");
                metrics::STAGE_FAILURES.inc();
                StageStatus::Failed
            }
        };
        stages.push(StageReport {
            stage: Stage::Forward,
            status: forward,
        });

        metrics::INGESTED_TOTAL.inc();
        debug!(patient = %sample.patient_id, anomaly = sample.is_anomaly, "sample processed");
        PipelineOutcome {
            status: ValidationStatus::Valid,
            stages,
        }
    }
}
