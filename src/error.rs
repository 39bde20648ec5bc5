// Core error taxonomy - every failure class the service boundary surfaces
//
// Capability failures never appear here: the pipeline absorbs them into
// fallback outcomes and records them through the audit sink. A submitter
// always sees either a created report or a precise authorization/input
// error; a reviewer always sees either an updated report or a precise
// state/authorization error.

use thiserror::Error;
use uuid::Uuid;

use crate::access::AccessError;
use crate::report::state_machine::TransitionError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller lacks the role or entity scope for the operation. Never
    /// retried.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// The operation is allowed for this caller, but not in the report's
    /// current state. Never retried.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Concurrent transition race on the same report. Retryable after a
    /// re-read.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("report {0} not found")]
    NotFound(Uuid),

    /// Submission input failed basic checks before any capability ran.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl CoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
}

impl From<AccessError> for CoreError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden { .. } => CoreError::Authorization(err.to_string()),
            AccessError::InvalidState { .. } => CoreError::InvalidState(err.to_string()),
        }
    }
}

impl From<TransitionError> for CoreError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::IllegalTransition { .. } => CoreError::InvalidState(err.to_string()),
            TransitionError::Conflict { .. } => CoreError::Conflict(err.to_string()),
            TransitionError::NotFound(id) => CoreError::NotFound(id),
            TransitionError::Storage(message) => CoreError::Storage(message),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CoreError::NotFound(id),
            other => CoreError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportStatus;

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(CoreError::Conflict("race".to_string()).is_retryable());
        assert!(!CoreError::Authorization("no".to_string()).is_retryable());
        assert!(!CoreError::NotFound(Uuid::new_v4()).is_retryable());
    }

    #[test]
    fn test_transition_errors_map_to_their_taxonomy_class() {
        let id = Uuid::new_v4();
        let conflict = TransitionError::Conflict {
            report_id: id,
            expected: ReportStatus::Submitted,
            actual: ReportStatus::Validating,
        };
        assert!(matches!(CoreError::from(conflict), CoreError::Conflict(_)));
        assert!(matches!(
            CoreError::from(TransitionError::NotFound(id)),
            CoreError::NotFound(got) if got == id
        ));
    }
}
