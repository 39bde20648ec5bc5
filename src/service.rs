// Exposed workflow operations - the boundary the external API layer calls

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::access::{AccessPolicy, Action};
use crate::error::CoreError;
use crate::identity::Identity;
use crate::notify::{EventKind, MessageContext, Notifier};
use crate::pipeline::{PipelineOrchestrator, PipelineOutcome};
use crate::report::state_machine::ReportStateMachine;
use crate::report::{DocumentRef, Report, ReportKind, ReportStatus};
use crate::store::{ReportFilter, ReportStore};

/// Listing filter accepted from callers. Entity restrictions are clamped to
/// the caller's scope before they reach the store.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<ReportStatus>,
    pub entity_ref: Option<String>,
    pub limit: Option<usize>,
}

/// Review workflow settings.
#[derive(Debug, Clone)]
pub struct ReviewPolicy {
    /// Minimum rejection-comment length, counted in characters after
    /// trimming.
    pub min_comment_chars: usize,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            min_comment_chars: 3,
        }
    }
}

/// Facade over gate, state machine, store, orchestrator and fan-out.
pub struct ReportService {
    policy: AccessPolicy,
    store: Arc<dyn ReportStore>,
    state_machine: Arc<ReportStateMachine>,
    orchestrator: Arc<PipelineOrchestrator>,
    notifier: Arc<Notifier>,
    review: ReviewPolicy,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        state_machine: Arc<ReportStateMachine>,
        orchestrator: Arc<PipelineOrchestrator>,
        notifier: Arc<Notifier>,
        review: ReviewPolicy,
    ) -> Self {
        Self {
            policy: AccessPolicy::new(),
            store,
            state_machine,
            orchestrator,
            notifier,
            review,
        }
    }

    /// Creates the report in `Submitted`. The assessment pipeline is driven
    /// separately via [`ReportService::process_report`], so submission
    /// latency stays flat and callers observe the initial state.
    pub async fn submit_report(
        &self,
        identity: &Identity,
        entity_ref: &str,
        kind: ReportKind,
        document: DocumentRef,
    ) -> Result<Report, CoreError> {
        self.policy.authorize_submit(identity, entity_ref)?;
        if document.file_name.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "document file name is empty".to_string(),
            ));
        }
        if document.size_bytes == 0 {
            return Err(CoreError::InvalidInput("document is empty".to_string()));
        }

        let report = Report::new(
            entity_ref,
            entity_display_name(entity_ref),
            kind,
            document,
            &identity.user_id,
        );
        let created = self.state_machine.create(report).await?;
        info!(
            report_id = %created.id,
            entity = %entity_ref,
            kind = %kind,
            submitted_by = %identity.user_id,
            "report submitted"
        );
        Ok(created)
    }

    /// Drives the three-stage assessment pipeline for a submitted report.
    pub async fn process_report(&self, report_id: Uuid) -> Result<PipelineOutcome, CoreError> {
        Ok(self.orchestrator.run_pipeline(report_id).await?)
    }

    pub async fn get_report(&self, identity: &Identity, id: Uuid) -> Result<Report, CoreError> {
        let report = self.store.get(id).await?;
        self.policy.authorize(identity, Action::Read, &report)?;
        Ok(report)
    }

    /// Lists reports visible to the caller. Reviewers triage by risk first;
    /// submitters read their own filings chronologically.
    pub async fn list_reports(
        &self,
        identity: &Identity,
        filter: ListFilter,
    ) -> Result<Vec<Report>, CoreError> {
        let entity_refs = match &filter.entity_ref {
            Some(entity_ref) => {
                if !identity.can_access_entity(entity_ref) {
                    return Err(CoreError::Authorization(format!(
                        "entity {entity_ref} is outside the caller's scope"
                    )));
                }
                Some(vec![entity_ref.clone()])
            }
            None if identity.has_unrestricted_scope() => None,
            None => Some(identity.entity_scope.clone()),
        };

        let mut reports = self
            .store
            .list(&ReportFilter {
                status: filter.status,
                entity_refs,
                limit: None,
            })
            .await?;

        if identity.is_reviewer() {
            reports.sort_by(|a, b| {
                let score_a = a.risk.as_ref().map(|r| r.score).unwrap_or(0.0);
                let score_b = b.risk.as_ref().map(|r| r.score).unwrap_or(0.0);
                score_b
                    .partial_cmp(&score_a)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| b.submitted_at.cmp(&a.submitted_at))
            });
        } else {
            reports.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        }
        if let Some(limit) = filter.limit {
            reports.truncate(limit);
        }
        Ok(reports)
    }

    pub async fn approve_report(
        &self,
        identity: &Identity,
        id: Uuid,
        comment: Option<String>,
    ) -> Result<Report, CoreError> {
        let report = self.store.get(id).await?;
        self.policy.authorize(identity, Action::Approve, &report)?;

        let updated = self
            .state_machine
            .approve(id, &identity.user_id, comment)
            .await?;
        info!(report_id = %id, reviewed_by = %identity.user_id, "report approved");
        self.notifier
            .notify(
                updated.id,
                &updated.submitted_by,
                EventKind::Approved,
                review_context(&updated),
            )
            .await;
        Ok(updated)
    }

    pub async fn reject_report(
        &self,
        identity: &Identity,
        id: Uuid,
        comment: &str,
    ) -> Result<Report, CoreError> {
        let comment = comment.trim();
        if comment.chars().count() < self.review.min_comment_chars {
            return Err(CoreError::InvalidInput(format!(
                "rejection comment must be at least {} characters",
                self.review.min_comment_chars
            )));
        }

        let report = self.store.get(id).await?;
        self.policy.authorize(identity, Action::Reject, &report)?;

        let updated = self
            .state_machine
            .reject(id, &identity.user_id, comment.to_string())
            .await?;
        info!(report_id = %id, reviewed_by = %identity.user_id, "report rejected");
        self.notifier
            .notify(
                updated.id,
                &updated.submitted_by,
                EventKind::Rejected,
                review_context(&updated),
            )
            .await;
        Ok(updated)
    }
}

/// Entity display name lookup. A directory service owns this in production;
/// the known supervised entities cover the demo and tests.
fn entity_display_name(entity_ref: &str) -> String {
    match entity_ref {
        "MBANK001" => "mBank S.A.".to_string(),
        "PKOBP001" => "PKO Bank Polski S.A.".to_string(),
        "PEKAO001" => "Bank Pekao S.A.".to_string(),
        "BZWBK001" => "Santander Bank Polska S.A.".to_string(),
        other => format!("Entity {other}"),
    }
}

/// Context attached to approve/reject notifications.
fn review_context(report: &Report) -> MessageContext {
    let mut context = MessageContext::new();
    context.insert("report_id".to_string(), json!(report.id.to_string()));
    context.insert("entity_name".to_string(), json!(report.entity_name));
    context.insert("file_name".to_string(), json!(report.document.file_name));
    context.insert("status".to_string(), json!(report.status.as_str()));
    if let Some(decision) = &report.decision {
        context.insert(
            "reviewed_at".to_string(),
            json!(decision.reviewed_at.to_rfc3339()),
        );
        if let Some(comment) = &decision.comment {
            context.insert("comment".to_string(), json!(comment));
        }
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_entities_resolve_to_display_names() {
        assert_eq!(entity_display_name("MBANK001"), "mBank S.A.");
        assert_eq!(entity_display_name("XYZ999"), "Entity XYZ999");
    }
}
