// Three-stage assessment pipeline with per-call timeouts and fallbacks

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::time::timeout;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::notify::{EventKind, MessageContext, Notifier};
use crate::report::state_machine::{ReportStateMachine, TransitionError};
use crate::report::{Report, RiskOutcome, ValidationOutcome};
use crate::telemetry::create_pipeline_span;

use super::audit::{AuditEvent, AuditSink, PipelineStage};
use super::capability::{CapabilityError, DocumentValidator, RiskAssessor};
use super::fallback;

/// Per-stage timeouts, escalation switches and the supervisor pool.
#[derive(Debug, Clone)]
pub struct PipelinePolicy {
    pub validate_timeout: Duration,
    pub assess_timeout: Duration,
    /// When true, a failed validate call moves the report to the terminal
    /// `ValidationFailed` state instead of continuing on the fallback
    /// outcome. Off by default.
    pub escalate_validation_failure: bool,
    /// As above, for the assess stage and `AnalysisFailed`.
    pub escalate_analysis_failure: bool,
    /// Identities notified of every report that finishes the pipeline.
    pub supervisor_recipients: Vec<String>,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            validate_timeout: Duration::from_secs(30),
            assess_timeout: Duration::from_secs(60),
            escalate_validation_failure: false,
            escalate_analysis_failure: false,
            supervisor_recipients: Vec::new(),
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// All stages finished; the report is `Analyzed` and awaiting review.
    Completed(Report),
    /// A capability failure escalated to a terminal failed state
    /// (configuration-gated; off by default).
    Halted {
        report: Report,
        stage: PipelineStage,
    },
}

impl PipelineOutcome {
    pub fn report(&self) -> &Report {
        match self {
            Self::Completed(report) => report,
            Self::Halted { report, .. } => report,
        }
    }
}

/// Sequences validate → assess → notify for one report.
///
/// Capability failures and timeouts are absorbed into fallback outcomes and
/// audited; a failure in one stage never prevents the next from running, and
/// no stage is ever silently skipped. Conflicts from the state machine
/// surface unchanged: a report already past `Submitted` is not re-run.
pub struct PipelineOrchestrator {
    validator: Arc<dyn DocumentValidator>,
    assessor: Arc<dyn RiskAssessor>,
    state_machine: Arc<ReportStateMachine>,
    notifier: Arc<Notifier>,
    audit: Arc<dyn AuditSink>,
    policy: PipelinePolicy,
}

impl PipelineOrchestrator {
    pub fn new(
        validator: Arc<dyn DocumentValidator>,
        assessor: Arc<dyn RiskAssessor>,
        state_machine: Arc<ReportStateMachine>,
        notifier: Arc<Notifier>,
        audit: Arc<dyn AuditSink>,
        policy: PipelinePolicy,
    ) -> Self {
        Self {
            validator,
            assessor,
            state_machine,
            notifier,
            audit,
            policy,
        }
    }

    pub async fn run_pipeline(
        &self,
        report_id: Uuid,
    ) -> Result<PipelineOutcome, TransitionError> {
        let span = create_pipeline_span("run_pipeline", report_id);
        self.run_pipeline_inner(report_id).instrument(span).await
    }

    async fn run_pipeline_inner(
        &self,
        report_id: Uuid,
    ) -> Result<PipelineOutcome, TransitionError> {
        let report = self.state_machine.begin_validation(report_id).await?;
        info!(
            report_id = %report_id,
            entity = %report.entity_ref,
            kind = %report.kind,
            "pipeline started"
        );

        // Stage 1: structural validation
        let (validation, validate_failed) = match timeout(
            self.policy.validate_timeout,
            self.validator.validate(&report.document),
        )
        .await
        {
            Ok(Ok(outcome)) => (outcome, false),
            Ok(Err(err)) => (self.absorb_validate_failure(report_id, err), true),
            Err(_) => (
                self.absorb_validate_failure(
                    report_id,
                    CapabilityError::TimedOut(self.policy.validate_timeout),
                ),
                true,
            ),
        };

        if validate_failed && self.policy.escalate_validation_failure {
            return self.escalate_validation(report_id, validation).await;
        }

        let report = self
            .state_machine
            .complete_validation(report_id, validation.clone())
            .await?;

        // Stage 2: risk analysis - runs regardless of the validity flag
        let report = self.state_machine.begin_analysis(report.id).await?;
        let (risk, assess_failed) = match timeout(
            self.policy.assess_timeout,
            self.assessor.assess(&report.document, &validation),
        )
        .await
        {
            // Re-derive urgency and level from the returned score so the
            // mapping stays uniform no matter what the capability claimed.
            Ok(Ok(outcome)) => (normalize(outcome), false),
            Ok(Err(err)) => (self.absorb_assess_failure(report_id, err), true),
            Err(_) => (
                self.absorb_assess_failure(
                    report_id,
                    CapabilityError::TimedOut(self.policy.assess_timeout),
                ),
                true,
            ),
        };

        if assess_failed && self.policy.escalate_analysis_failure {
            return self.escalate_analysis(report_id, risk).await;
        }

        let report = self
            .state_machine
            .complete_analysis(report_id, risk)
            .await?;

        // Stage 3: notifications - one compose per recipient class
        self.notify_completion(&report).await;

        info!(
            report_id = %report_id,
            status = %report.status,
            score = report.risk.as_ref().map(|r| r.score).unwrap_or_default(),
            "pipeline finished"
        );
        Ok(PipelineOutcome::Completed(report))
    }

    fn absorb_validate_failure(&self, report_id: Uuid, err: CapabilityError) -> ValidationOutcome {
        self.record_failure(report_id, PipelineStage::Validate, &err);
        fallback::validation_fallback(&err)
    }

    fn absorb_assess_failure(&self, report_id: Uuid, err: CapabilityError) -> RiskOutcome {
        self.record_failure(report_id, PipelineStage::Assess, &err);
        fallback::risk_fallback(&err)
    }

    fn record_failure(&self, report_id: Uuid, stage: PipelineStage, err: &CapabilityError) {
        warn!(
            report_id = %report_id,
            stage = %stage,
            error = %err,
            "capability failed, continuing with fallback outcome"
        );
        self.audit.record(AuditEvent::CapabilityFailed {
            report_id,
            stage,
            error: err.to_string(),
            at: Utc::now(),
        });
        self.audit.record(AuditEvent::FallbackApplied {
            report_id,
            stage,
            at: Utc::now(),
        });
    }

    async fn escalate_validation(
        &self,
        report_id: Uuid,
        validation: ValidationOutcome,
    ) -> Result<PipelineOutcome, TransitionError> {
        self.audit.record(AuditEvent::Escalated {
            report_id,
            stage: PipelineStage::Validate,
            at: Utc::now(),
        });
        let report = self
            .state_machine
            .fail_validation(report_id, validation)
            .await?;
        // The submitter still hears about it; the report just never reaches
        // the review queue.
        self.notifier
            .notify(
                report.id,
                &report.submitted_by,
                EventKind::ValidationFailed,
                completion_context(&report),
            )
            .await;
        Ok(PipelineOutcome::Halted {
            report,
            stage: PipelineStage::Validate,
        })
    }

    async fn escalate_analysis(
        &self,
        report_id: Uuid,
        risk: RiskOutcome,
    ) -> Result<PipelineOutcome, TransitionError> {
        self.audit.record(AuditEvent::Escalated {
            report_id,
            stage: PipelineStage::Assess,
            at: Utc::now(),
        });
        let report = self.state_machine.fail_analysis(report_id, risk).await?;
        // Both recipient classes are still told the report arrived; the
        // stall is visible in the status carried by the context.
        self.notify_completion(&report).await;
        Ok(PipelineOutcome::Halted {
            report,
            stage: PipelineStage::Assess,
        })
    }

    /// One compose per recipient class. The submitter hears about validation
    /// problems; supervisors always get the new-arrival event for triage.
    async fn notify_completion(&self, report: &Report) {
        let submitter_kind = match &report.validation {
            Some(outcome) if !outcome.is_valid => EventKind::ValidationFailed,
            _ => EventKind::Submitted,
        };
        self.notifier
            .notify(
                report.id,
                &report.submitted_by,
                submitter_kind,
                completion_context(report),
            )
            .await;
        self.notifier
            .notify_class(
                report.id,
                &self.policy.supervisor_recipients,
                EventKind::Submitted,
                completion_context(report),
            )
            .await;
    }
}

fn normalize(outcome: RiskOutcome) -> RiskOutcome {
    RiskOutcome::from_score(
        outcome.category,
        outcome.score,
        outcome.anomalies,
        outcome.confidence,
        outcome.justification,
    )
}

/// Context shared by every pipeline-completion notification.
fn completion_context(report: &Report) -> MessageContext {
    let mut context = MessageContext::new();
    context.insert("report_id".to_string(), json!(report.id.to_string()));
    context.insert("entity_name".to_string(), json!(report.entity_name));
    context.insert("report_kind".to_string(), json!(report.kind.as_str()));
    context.insert("file_name".to_string(), json!(report.document.file_name));
    context.insert("status".to_string(), json!(report.status.as_str()));
    context.insert(
        "submitted_at".to_string(),
        json!(report.submitted_at.to_rfc3339()),
    );
    if let Some(risk) = &report.risk {
        context.insert("risk_score".to_string(), json!(risk.score));
        context.insert("urgency".to_string(), json!(risk.urgency.as_str()));
    }
    context
}
