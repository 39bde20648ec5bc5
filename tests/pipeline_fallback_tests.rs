//! Pipeline fallback policy tests
//!
//! The orchestrator must keep the workflow moving when a capability cannot
//! produce a confident result: every failure or timeout is absorbed into a
//! synthetic low-confidence outcome, audited, and the next stage still runs.
//!
//! Test coverage:
//! - Validate failure -> fallback outcome (confidence 0.5), report still
//!   reaches `analyzed`, never stalls at `validating`
//! - Assess failure -> fallback outcome (score 5.0, unknown, urgent)
//! - Capability timeouts take the same fallback path
//! - Urgency is re-derived from the score, whatever the capability claimed
//! - Configuration-gated escalation to terminal failed states
//! - Re-running the pipeline is rejected by the conflict check

use std::sync::Arc;
use std::time::Duration;

use veritas::pipeline::mocks::{MockAssessor, MockValidator};
use veritas::{
    CoreError, EventKind, PipelineOutcome, PipelineStage, ReportKind, ReportStatus, RiskCategory,
    RiskLevel, RiskOutcome, Urgency, ValidationOutcome,
};

mod common;
use common::{builder, clean_risk, document, harness, officer};

#[tokio::test]
async fn test_validate_failure_degrades_and_still_reaches_analyzed() {
    let validator = Arc::new(MockValidator::failing("model unreachable"));
    let h = builder().with_validator(validator.clone()).build();

    let report = h
        .service
        .submit_report(&officer(), "MBANK001", ReportKind::Liquidity, document())
        .await
        .unwrap();
    let outcome = h.service.process_report(report.id).await.unwrap();

    let report = match outcome {
        PipelineOutcome::Completed(report) => report,
        other => panic!("expected completed pipeline, got {other:?}"),
    };
    assert_eq!(report.status, ReportStatus::Analyzed);

    let validation = report.validation.expect("fallback outcome attached");
    assert!(!validation.is_valid);
    assert_eq!(validation.confidence, 0.5);
    assert_eq!(validation.errors.len(), 1);
    assert!(validation.errors[0].issue.contains("model unreachable"));

    assert_eq!(h.audit.failures_for(PipelineStage::Validate), 1);
}

#[tokio::test]
async fn test_assess_failure_degrades_to_urgent_unknown() {
    let h = builder()
        .with_assessor(Arc::new(MockAssessor::failing("scoring backend down")))
        .build();

    let report = h
        .service
        .submit_report(&officer(), "MBANK001", ReportKind::Capital, document())
        .await
        .unwrap();
    let outcome = h.service.process_report(report.id).await.unwrap();

    let report = outcome.report();
    assert_eq!(report.status, ReportStatus::Analyzed);

    let risk = report.risk.as_ref().expect("fallback outcome attached");
    assert_eq!(risk.score, 5.0);
    assert_eq!(risk.category, RiskCategory::Unknown);
    assert_eq!(risk.confidence, 0.3);
    assert_eq!(risk.urgency, Urgency::Urgent);
    assert!(risk.anomalies.is_empty());
    assert_eq!(risk.justification, "assessment unavailable");

    assert_eq!(h.audit.failures_for(PipelineStage::Assess), 1);
}

#[tokio::test]
async fn test_a_failed_stage_never_skips_the_next_one() {
    // Validate fails; assess must still run, and must see the fallback
    // outcome (is_valid = false), not a skipped stage.
    let assessor = Arc::new(MockAssessor::succeeding(clean_risk()));
    let h = builder()
        .with_validator(Arc::new(MockValidator::failing("offline")))
        .with_assessor(assessor.clone())
        .build();

    let report = h
        .service
        .submit_report(&officer(), "MBANK001", ReportKind::Aml, document())
        .await
        .unwrap();
    h.service.process_report(report.id).await.unwrap();

    let calls = assessor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "q3-liquidity.xlsx");
    assert!(!calls[0].1, "assess must observe the fallback validity flag");
}

#[tokio::test]
async fn test_validate_timeout_takes_the_fallback_path() {
    let slow = MockValidator::hanging(Duration::from_millis(500), ValidationOutcome::valid(0.99));
    let h = builder()
        .with_validator(Arc::new(slow))
        .with_policy(|policy| policy.validate_timeout = Duration::from_millis(50))
        .build();

    let report = h
        .service
        .submit_report(&officer(), "MBANK001", ReportKind::Liquidity, document())
        .await
        .unwrap();
    let outcome = h.service.process_report(report.id).await.unwrap();

    let report = outcome.report();
    assert_eq!(report.status, ReportStatus::Analyzed);
    let validation = report.validation.as_ref().unwrap();
    assert!(!validation.is_valid);
    assert_eq!(validation.confidence, 0.5);
    assert!(validation.errors[0].issue.contains("timed out"));
}

#[tokio::test]
async fn test_urgency_is_rederived_from_the_returned_score() {
    // A capability claiming a routine 8.2 must end up critical: urgency is a
    // pure function of the score, applied uniformly.
    let inconsistent = RiskOutcome {
        category: RiskCategory::Operational,
        score: 8.2,
        urgency: Urgency::Routine,
        level: RiskLevel::Low,
        anomalies: vec!["unexplained exposure jump".to_string()],
        confidence: 0.88,
        justification: "exposure concentration".to_string(),
    };
    let h = builder()
        .with_assessor(Arc::new(MockAssessor::succeeding(inconsistent)))
        .build();

    let report = h
        .service
        .submit_report(&officer(), "MBANK001", ReportKind::Governance, document())
        .await
        .unwrap();
    let outcome = h.service.process_report(report.id).await.unwrap();

    let risk = outcome.report().risk.as_ref().unwrap().clone();
    assert_eq!(risk.score, 8.2);
    assert_eq!(risk.urgency, Urgency::Critical);
    assert_eq!(risk.level, RiskLevel::High);
}

#[tokio::test]
async fn test_escalation_moves_validation_failure_to_terminal_state() {
    let h = builder()
        .with_validator(Arc::new(MockValidator::failing("hard outage")))
        .with_policy(|policy| policy.escalate_validation_failure = true)
        .build();

    let officer = officer();
    let (_channel, mut inbox) = h.registry.register(&officer.user_id).await;

    let report = h
        .service
        .submit_report(&officer, "MBANK001", ReportKind::Liquidity, document())
        .await
        .unwrap();
    let outcome = h.service.process_report(report.id).await.unwrap();

    match outcome {
        PipelineOutcome::Halted { report, stage } => {
            assert_eq!(stage, PipelineStage::Validate);
            assert_eq!(report.status, ReportStatus::ValidationFailed);
            assert!(report.validation.is_some());
            assert!(report.risk.is_none());
        }
        other => panic!("expected halted pipeline, got {other:?}"),
    }

    // Even a halted report is never silent toward the submitter.
    let message = inbox.recv().await.unwrap();
    assert_eq!(message.kind, EventKind::ValidationFailed);
}

#[tokio::test]
async fn test_escalation_moves_analysis_failure_to_terminal_state() {
    let h = builder()
        .with_assessor(Arc::new(MockAssessor::failing("hard outage")))
        .with_policy(|policy| policy.escalate_analysis_failure = true)
        .build();

    let report = h
        .service
        .submit_report(&officer(), "MBANK001", ReportKind::Aml, document())
        .await
        .unwrap();
    let outcome = h.service.process_report(report.id).await.unwrap();

    match outcome {
        PipelineOutcome::Halted { report, stage } => {
            assert_eq!(stage, PipelineStage::Assess);
            assert_eq!(report.status, ReportStatus::AnalysisFailed);
            assert!(report.validation.is_some());
            assert!(report.risk.is_some());
        }
        other => panic!("expected halted pipeline, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rerunning_the_pipeline_conflicts() {
    let h = harness();
    let report = h
        .service
        .submit_report(&officer(), "MBANK001", ReportKind::Liquidity, document())
        .await
        .unwrap();
    h.service.process_report(report.id).await.unwrap();

    let err = h.service.process_report(report.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Conflict(_)));
    assert!(err.is_retryable());
}
