//! End-to-end workflow tests
//!
//! Full submission-to-decision journeys through the service boundary,
//! including the degraded path where every capability is down and the
//! workflow still carries the report to a reviewable decision.
//!
//! Test coverage:
//! - Happy path: submit -> pipeline -> approve, with outcomes attached and
//!   the decision recorded
//! - Fully degraded path: validate and assess both down, report still
//!   reaches `analyzed`, gets approved, submitter is notified
//! - Reject path records the comment and notifies
//! - Supervisor listings triage by risk score

use std::sync::Arc;

use veritas::pipeline::mocks::{MockAssessor, MockValidator};
use veritas::{
    EventKind, ListFilter, PipelineOutcome, ReportKind, ReportStatus, RiskCategory, RiskOutcome,
    Urgency,
};

mod common;
use common::{builder, document, harness, officer, supervisor};

#[tokio::test]
async fn test_happy_path_submit_assess_approve() {
    let h = harness();
    let officer = officer();
    let supervisor = supervisor();

    let report = h
        .service
        .submit_report(&officer, "MBANK001", ReportKind::Liquidity, document())
        .await
        .unwrap();
    assert_eq!(report.status, ReportStatus::Submitted);
    assert_eq!(report.entity_name, "mBank S.A.");

    let outcome = h.service.process_report(report.id).await.unwrap();
    let processed = match outcome {
        PipelineOutcome::Completed(report) => report,
        other => panic!("expected completed pipeline, got {other:?}"),
    };
    assert_eq!(processed.status, ReportStatus::Analyzed);
    assert!(processed.validation.as_ref().unwrap().is_valid);
    assert_eq!(processed.risk.as_ref().unwrap().urgency, Urgency::Routine);

    let approved = h
        .service
        .approve_report(&supervisor, report.id, Some("all in order".to_string()))
        .await
        .unwrap();
    assert_eq!(approved.status, ReportStatus::Approved);
    assert!(approved.validation.is_some() && approved.risk.is_some());
    let decision = approved.decision.unwrap();
    assert_eq!(decision.reviewed_by, "sup-001");
    assert_eq!(decision.comment.as_deref(), Some("all in order"));
}

#[tokio::test]
async fn test_fully_degraded_pipeline_still_reaches_a_reviewable_decision() {
    // Validate and assess both down. The report must still make it to the
    // review queue on fallback outcomes and be approvable there.
    let h = builder()
        .with_validator(Arc::new(MockValidator::failing("validator outage")))
        .with_assessor(Arc::new(MockAssessor::failing("assessor outage")))
        .build();
    let officer = officer();
    let supervisor = supervisor();

    let (_channel, mut inbox) = h.registry.register(&officer.user_id).await;

    let report = h
        .service
        .submit_report(&officer, "MBANK001", ReportKind::Liquidity, document())
        .await
        .unwrap();
    assert_eq!(report.status, ReportStatus::Submitted);

    let outcome = h.service.process_report(report.id).await.unwrap();
    let processed = outcome.report();
    assert_eq!(processed.status, ReportStatus::Analyzed);

    let validation = processed.validation.as_ref().unwrap();
    assert_eq!(validation.confidence, 0.5);
    assert!(!validation.is_valid);

    let risk = processed.risk.as_ref().unwrap();
    assert_eq!(risk.score, 5.0);
    assert_eq!(risk.urgency, Urgency::Urgent);
    assert_eq!(risk.category, RiskCategory::Unknown);

    // The submitter heard about the validation problems right away.
    assert_eq!(
        inbox.recv().await.unwrap().kind,
        EventKind::ValidationFailed
    );

    let approved = h
        .service
        .approve_report(&supervisor, report.id, Some("ok".to_string()))
        .await
        .unwrap();
    assert_eq!(approved.status, ReportStatus::Approved);
    assert_eq!(approved.decision.unwrap().reviewed_by, "sup-001");

    // And then about the approval, on the same live channel.
    assert_eq!(inbox.recv().await.unwrap().kind, EventKind::Approved);
}

#[tokio::test]
async fn test_reject_path_records_comment_and_notifies() {
    let h = harness();
    let officer = officer();
    let (_channel, mut inbox) = h.registry.register(&officer.user_id).await;

    let report = h
        .service
        .submit_report(&officer, "MBANK001", ReportKind::Aml, document())
        .await
        .unwrap();
    h.service.process_report(report.id).await.unwrap();

    let rejected = h
        .service
        .reject_report(&supervisor(), report.id, "transaction rows 14-20 incomplete")
        .await
        .unwrap();
    assert_eq!(rejected.status, ReportStatus::Rejected);
    assert_eq!(
        rejected.decision.unwrap().comment.as_deref(),
        Some("transaction rows 14-20 incomplete")
    );

    assert_eq!(inbox.recv().await.unwrap().kind, EventKind::Submitted);
    let decision_message = inbox.recv().await.unwrap();
    assert_eq!(decision_message.kind, EventKind::Rejected);
    assert_eq!(
        decision_message
            .context
            .get("comment")
            .and_then(|v| v.as_str()),
        Some("transaction rows 14-20 incomplete")
    );
}

#[tokio::test]
async fn test_supervisor_listing_triages_by_risk_score() {
    let scores = [2.1, 9.3, 6.0];
    let assessor = MockAssessor::scripted(
        scores
            .iter()
            .map(|score| {
                RiskOutcome::from_score(
                    RiskCategory::Operational,
                    *score,
                    Vec::new(),
                    0.9,
                    format!("scripted score {score}"),
                )
            })
            .collect(),
    );
    let h = builder().with_assessor(Arc::new(assessor)).build();
    let officer = officer();

    for _ in scores {
        let report = h
            .service
            .submit_report(&officer, "MBANK001", ReportKind::Liquidity, document())
            .await
            .unwrap();
        h.service.process_report(report.id).await.unwrap();
    }

    let listed = h
        .service
        .list_reports(&supervisor(), ListFilter::default())
        .await
        .unwrap();
    let listed_scores: Vec<f64> = listed
        .iter()
        .map(|r| r.risk.as_ref().unwrap().score)
        .collect();
    assert_eq!(listed_scores, vec![9.3, 6.0, 2.1]);
}

#[tokio::test]
async fn test_empty_documents_are_rejected_before_the_pipeline() {
    let h = harness();
    let err = h
        .service
        .submit_report(
            &officer(),
            "MBANK001",
            ReportKind::Liquidity,
            veritas::DocumentRef::new("empty.xlsx", 0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, veritas::CoreError::InvalidInput(_)));
}
