// Report lifecycle transitions - the only component that mutates status

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::report::types::{
    Report, ReportStatus, ReviewDecision, RiskOutcome, ValidationOutcome,
};
use crate::store::{ReportStore, StoreError};

#[derive(Debug, Error)]
pub enum TransitionError {
    /// The requested edge does not exist in the lifecycle graph.
    #[error("cannot move report {report_id} from {from} to {to}")]
    IllegalTransition {
        report_id: Uuid,
        from: ReportStatus,
        to: ReportStatus,
    },

    /// The report advanced past the expected state since the caller read it.
    /// Retryable after a re-read; never retried here.
    #[error("report {report_id} is {actual}, transition expected {expected}")]
    Conflict {
        report_id: Uuid,
        expected: ReportStatus,
        actual: ReportStatus,
    },

    #[error("report {0} not found")]
    NotFound(Uuid),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for TransitionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => TransitionError::NotFound(id),
            other => TransitionError::Storage(other.to_string()),
        }
    }
}

/// Legal lifecycle edges. Monotonic: no state is ever revisited.
fn is_legal(from: ReportStatus, to: ReportStatus) -> bool {
    use ReportStatus::*;
    matches!(
        (from, to),
        (Submitted, Validating)
            | (Validating, Validated)
            | (Validating, ValidationFailed)
            | (Validated, Analyzing)
            | (Analyzing, Analyzed)
            | (Analyzing, AnalysisFailed)
            | (Analyzed, Approved)
            | (Analyzed, Rejected)
    )
}

/// Owns the canonical report lifecycle. Every transition is one atomic
/// read-check-write against the store under a per-report-id lock, so two
/// concurrent transitions on the same id never interleave while distinct
/// reports stay fully independent.
pub struct ReportStateMachine {
    store: Arc<dyn ReportStore>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ReportStateMachine {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Creates the report in `Submitted`, atomically with the entity itself.
    pub async fn create(&self, report: Report) -> Result<Report, TransitionError> {
        debug_assert_eq!(report.status, ReportStatus::Submitted);
        let created = self.store.create(report).await?;
        info!(
            report_id = %created.id,
            entity = %created.entity_ref,
            kind = %created.kind,
            "report created"
        );
        Ok(created)
    }

    /// One atomic transition. `expected` names the state the caller believes
    /// the report is in; a mismatch is a conflict, not a lifecycle error.
    async fn advance<F>(
        &self,
        id: Uuid,
        expected: ReportStatus,
        to: ReportStatus,
        mutate: F,
    ) -> Result<Report, TransitionError>
    where
        F: FnOnce(&mut Report),
    {
        if !is_legal(expected, to) {
            return Err(TransitionError::IllegalTransition {
                report_id: id,
                from: expected,
                to,
            });
        }

        let lock = self.lock_for(id).await;
        let _guard = lock.lock().await;

        let mut report = self.store.get(id).await?;
        if report.status != expected {
            warn!(
                report_id = %id,
                expected = %expected,
                actual = %report.status,
                "transition conflict"
            );
            return Err(TransitionError::Conflict {
                report_id: id,
                expected,
                actual: report.status,
            });
        }

        report.status = to;
        mutate(&mut report);
        debug_assert!(report.outcomes_consistent());
        let updated = self.store.update(report).await?;
        info!(report_id = %id, from = %expected, to = %to, "report transitioned");
        Ok(updated)
    }

    pub async fn begin_validation(&self, id: Uuid) -> Result<Report, TransitionError> {
        self.advance(id, ReportStatus::Submitted, ReportStatus::Validating, |_| {})
            .await
    }

    pub async fn complete_validation(
        &self,
        id: Uuid,
        outcome: ValidationOutcome,
    ) -> Result<Report, TransitionError> {
        self.advance(id, ReportStatus::Validating, ReportStatus::Validated, |r| {
            r.validation = Some(outcome)
        })
        .await
    }

    /// Terminal escalation; only taken when configured (the default policy
    /// degrades to a fallback outcome and continues).
    pub async fn fail_validation(
        &self,
        id: Uuid,
        outcome: ValidationOutcome,
    ) -> Result<Report, TransitionError> {
        self.advance(
            id,
            ReportStatus::Validating,
            ReportStatus::ValidationFailed,
            |r| r.validation = Some(outcome),
        )
        .await
    }

    pub async fn begin_analysis(&self, id: Uuid) -> Result<Report, TransitionError> {
        self.advance(id, ReportStatus::Validated, ReportStatus::Analyzing, |_| {})
            .await
    }

    pub async fn complete_analysis(
        &self,
        id: Uuid,
        outcome: RiskOutcome,
    ) -> Result<Report, TransitionError> {
        self.advance(id, ReportStatus::Analyzing, ReportStatus::Analyzed, |r| {
            r.risk = Some(outcome)
        })
        .await
    }

    /// Terminal escalation; see [`ReportStateMachine::fail_validation`].
    pub async fn fail_analysis(
        &self,
        id: Uuid,
        outcome: RiskOutcome,
    ) -> Result<Report, TransitionError> {
        self.advance(
            id,
            ReportStatus::Analyzing,
            ReportStatus::AnalysisFailed,
            |r| r.risk = Some(outcome),
        )
        .await
    }

    pub async fn approve(
        &self,
        id: Uuid,
        reviewed_by: &str,
        comment: Option<String>,
    ) -> Result<Report, TransitionError> {
        let reviewed_by = reviewed_by.to_string();
        self.advance(id, ReportStatus::Analyzed, ReportStatus::Approved, |r| {
            r.decision = Some(ReviewDecision {
                reviewed_by,
                comment,
                reviewed_at: Utc::now(),
            })
        })
        .await
    }

    pub async fn reject(
        &self,
        id: Uuid,
        reviewed_by: &str,
        comment: String,
    ) -> Result<Report, TransitionError> {
        let reviewed_by = reviewed_by.to_string();
        self.advance(id, ReportStatus::Analyzed, ReportStatus::Rejected, |r| {
            r.decision = Some(ReviewDecision {
                reviewed_by,
                comment: Some(comment),
                reviewed_at: Utc::now(),
            })
        })
        .await
    }
}
