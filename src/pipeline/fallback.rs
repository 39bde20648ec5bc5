// Degraded outcomes substituted when a capability cannot answer
//
// Each constructor is a pure function of the failure. The pipeline keeps
// moving on these values; a report never stalls because a capability was
// down, and never finishes silently.

use crate::notify::EventKind;
use crate::pipeline::capability::{CapabilityError, ComposedMessage};
use crate::report::{RiskCategory, RiskOutcome, StructuralError, ValidationOutcome};

/// Confidence attached to a synthesized validation outcome.
pub const FALLBACK_VALIDATION_CONFIDENCE: f64 = 0.5;
/// Mid-scale score attached when risk analysis is unavailable.
pub const FALLBACK_RISK_SCORE: f64 = 5.0;
/// Confidence attached to the fallback risk outcome.
pub const FALLBACK_RISK_CONFIDENCE: f64 = 0.3;

/// Validation outcome standing in for a failed validate call. The single
/// synthetic error names the capability failure so reviewers can see the
/// document was never actually checked.
pub fn validation_fallback(failure: &CapabilityError) -> ValidationOutcome {
    ValidationOutcome {
        is_valid: false,
        confidence: FALLBACK_VALIDATION_CONFIDENCE,
        errors: vec![StructuralError {
            field: "document".to_string(),
            row: None,
            issue: format!("structural validation unavailable: {failure}"),
        }],
        warnings: Vec::new(),
    }
}

/// Risk outcome standing in for a failed assess call: mid-scale score,
/// unknown category, low confidence. Urgency derives from the score like any
/// other outcome, which lands the report in the urgent review queue.
pub fn risk_fallback(_failure: &CapabilityError) -> RiskOutcome {
    RiskOutcome::from_score(
        RiskCategory::Unknown,
        FALLBACK_RISK_SCORE,
        Vec::new(),
        FALLBACK_RISK_CONFIDENCE,
        "assessment unavailable".to_string(),
    )
}

/// Fixed-language message used when Compose cannot answer.
pub fn generic_message(event: EventKind) -> ComposedMessage {
    let (title, body) = match event {
        EventKind::Submitted => (
            "Report received",
            "A report has been submitted and queued for supervisory review.",
        ),
        EventKind::Approved => (
            "Report approved",
            "Your report has been reviewed and approved.",
        ),
        EventKind::Rejected => (
            "Report rejected",
            "Your report has been reviewed and rejected. See the reviewer comment for details.",
        ),
        EventKind::ValidationFailed => (
            "Report validation issues",
            "Structural problems were found in your report. Review the validation errors and resubmit.",
        ),
    };
    ComposedMessage {
        title: title.to_string(),
        body: body.to_string(),
    }
}
