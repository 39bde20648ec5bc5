// Core types for the report assessment lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of financial report. Fixed set; submissions naming anything else
/// are rejected before the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Liquidity,
    Aml,
    Capital,
    Governance,
}

impl ReportKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "liquidity" => Some(Self::Liquidity),
            "aml" => Some(Self::Aml),
            "capital" => Some(Self::Capital),
            "governance" => Some(Self::Governance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquidity => "liquidity",
            Self::Aml => "aml",
            Self::Capital => "capital",
            Self::Governance => "governance",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report lifecycle status. Transitions are monotonic and owned by the
/// state machine; nothing else writes this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Submitted,
    Validating,
    Validated,
    Analyzing,
    Analyzed,
    Approved,
    Rejected,
    ValidationFailed,
    AnalysisFailed,
}

impl ReportStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Rejected | Self::ValidationFailed | Self::AnalysisFailed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Validating => "validating",
            Self::Validated => "validated",
            Self::Analyzing => "analyzing",
            Self::Analyzed => "analyzed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ValidationFailed => "validation_failed",
            Self::AnalysisFailed => "analysis_failed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency tier for supervisory triage, a pure function of the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Routine,
    Urgent,
    Critical,
}

impl Urgency {
    /// score >= 7.0 is critical, 5.0 <= score < 7.0 is urgent, else routine.
    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            Self::Critical
        } else if score >= 5.0 {
            Self::Urgent
        } else {
            Self::Routine
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Urgent => "urgent",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse risk banding derived from the score, shown alongside the urgency
/// tier in supervisor listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// score < 5.0 is low, 5.0 <= score < 7.0 is medium, else high.
    pub fn from_score(score: f64) -> Self {
        if score < 5.0 {
            Self::Low
        } else if score < 7.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Risk category assigned by the analysis stage. `Unknown` is reserved for
/// the fallback outcome when assessment is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Liquidity,
    Aml,
    Capital,
    Governance,
    Operational,
    Unknown,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquidity => "liquidity",
            Self::Aml => "aml",
            Self::Capital => "capital",
            Self::Governance => "governance",
            Self::Operational => "operational",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural problem found in a submitted document, with enough
/// context for the submitter to locate and fix it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralError {
    pub field: String,
    pub row: Option<u64>,
    pub issue: String,
}

/// Outcome of the structural validation stage. Immutable once attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub errors: Vec<StructuralError>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn valid(confidence: f64) -> Self {
        Self {
            is_valid: true,
            confidence,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn invalid(confidence: f64, errors: Vec<StructuralError>) -> Self {
        Self {
            is_valid: false,
            confidence,
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Outcome of the risk analysis stage. Immutable once attached. Urgency and
/// level are always derived from the score; use [`RiskOutcome::from_score`]
/// so the mapping cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskOutcome {
    pub category: RiskCategory,
    /// Risk score in [0, 10].
    pub score: f64,
    pub urgency: Urgency,
    pub level: RiskLevel,
    pub anomalies: Vec<String>,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub justification: String,
}

impl RiskOutcome {
    /// Builds an outcome with urgency and level derived from the score.
    /// Scores outside [0, 10] are clamped; capabilities are not trusted to
    /// stay in range.
    pub fn from_score(
        category: RiskCategory,
        score: f64,
        anomalies: Vec<String>,
        confidence: f64,
        justification: String,
    ) -> Self {
        let score = score.clamp(0.0, 10.0);
        Self {
            category,
            score,
            urgency: Urgency::from_score(score),
            level: RiskLevel::from_score(score),
            anomalies,
            confidence,
            justification,
        }
    }
}

/// Reviewer decision recorded when a supervisor approves or rejects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub reviewed_by: String,
    pub comment: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

/// Reference to the uploaded document. The raw bytes live with the external
/// storage collaborator; capabilities resolve the reference themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub file_name: String,
    pub size_bytes: u64,
}

impl DocumentRef {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes,
        }
    }
}

/// A financial report submission moving through the assessment workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    /// Supervised entity the report is filed for (e.g. MBANK001).
    pub entity_ref: String,
    pub entity_name: String,
    pub kind: ReportKind,
    pub status: ReportStatus,
    pub document: DocumentRef,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub validation: Option<ValidationOutcome>,
    pub risk: Option<RiskOutcome>,
    pub decision: Option<ReviewDecision>,
}

impl Report {
    pub fn new(
        entity_ref: impl Into<String>,
        entity_name: impl Into<String>,
        kind: ReportKind,
        document: DocumentRef,
        submitted_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_ref: entity_ref.into(),
            entity_name: entity_name.into(),
            kind,
            status: ReportStatus::Submitted,
            document,
            submitted_by: submitted_by.into(),
            submitted_at: Utc::now(),
            validation: None,
            risk: None,
            decision: None,
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk
            .as_ref()
            .map(|r| r.level == RiskLevel::High)
            .unwrap_or(false)
    }

    /// Invariant: a reviewed report carries both assessment outcomes.
    pub fn outcomes_consistent(&self) -> bool {
        match self.status {
            ReportStatus::Approved | ReportStatus::Rejected => {
                self.validation.is_some() && self.risk.is_some()
            }
            _ => true,
        }
    }
}
