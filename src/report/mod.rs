// Report domain: entity types and the lifecycle state machine

pub mod state_machine;
pub mod types;

pub use state_machine::{ReportStateMachine, TransitionError};
pub use types::{
    DocumentRef, Report, ReportKind, ReportStatus, ReviewDecision, RiskCategory, RiskLevel,
    RiskOutcome, StructuralError, Urgency, ValidationOutcome,
};
