// Role and scope checks for every read or state-changing operation

use thiserror::Error;

use crate::identity::{Identity, Role};
use crate::report::{Report, ReportStatus};

/// Operations the gate authorizes against an existing report. Submission is
/// authorized separately because the report does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Approve,
    Reject,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// The two denial classes are deliberately distinct: callers must be able to
/// tell "you may never do this" from "you may do this, but not yet".
#[derive(Debug, Error)]
pub enum AccessError {
    /// The caller's role or entity scope never allows this operation.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// The caller may perform this operation, but not while the report is in
    /// its current state.
    #[error("report is {status}, {action} requires {required}")]
    InvalidState {
        action: &'static str,
        status: ReportStatus,
        required: ReportStatus,
    },
}

/// Authorizes reads and state transitions against a caller's role and entity
/// scope. Pure checks over the supplied identity and report; holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn authorize_submit(
        &self,
        identity: &Identity,
        entity_ref: &str,
    ) -> Result<(), AccessError> {
        match identity.role {
            Role::Supervisor => Err(AccessError::Forbidden {
                reason: "supervisors review reports, they do not submit".to_string(),
            }),
            Role::Administrator => Ok(()),
            Role::Submitter => {
                if identity.can_access_entity(entity_ref) {
                    Ok(())
                } else {
                    Err(AccessError::Forbidden {
                        reason: format!("entity {entity_ref} is outside the caller's scope"),
                    })
                }
            }
        }
    }

    pub fn authorize(
        &self,
        identity: &Identity,
        action: Action,
        report: &Report,
    ) -> Result<(), AccessError> {
        match action {
            Action::Read => {
                if identity.can_access_entity(&report.entity_ref) {
                    Ok(())
                } else {
                    Err(AccessError::Forbidden {
                        reason: format!(
                            "entity {} is outside the caller's scope",
                            report.entity_ref
                        ),
                    })
                }
            }
            Action::Approve | Action::Reject => {
                // Role first: a submitter is told "never", not "not yet".
                if !identity.is_reviewer() {
                    return Err(AccessError::Forbidden {
                        reason: "only supervisors may decide on reports".to_string(),
                    });
                }
                if report.status != ReportStatus::Analyzed {
                    return Err(AccessError::InvalidState {
                        action: action.as_str(),
                        status: report.status,
                        required: ReportStatus::Analyzed,
                    });
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DocumentRef, ReportKind};

    fn report_for(entity_ref: &str) -> Report {
        Report::new(
            entity_ref,
            format!("Entity {entity_ref}"),
            ReportKind::Aml,
            DocumentRef::new("aml.xlsx", 1024),
            "officer-001",
        )
    }

    fn scoped_submitter() -> Identity {
        Identity::new("officer-001", "Entity Officer", Role::Submitter)
            .with_scope(vec!["MBANK001".to_string()])
    }

    #[test]
    fn test_submitter_may_only_submit_in_scope() {
        let policy = AccessPolicy::new();
        let officer = scoped_submitter();
        assert!(policy.authorize_submit(&officer, "MBANK001").is_ok());
        assert!(matches!(
            policy.authorize_submit(&officer, "PKOBP001"),
            Err(AccessError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_supervisor_never_submits() {
        let policy = AccessPolicy::new();
        let supervisor = Identity::new("sup-001", "Duty Supervisor", Role::Supervisor);
        assert!(matches!(
            policy.authorize_submit(&supervisor, "MBANK001"),
            Err(AccessError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_read_is_scope_gated_for_submitters_only() {
        let policy = AccessPolicy::new();
        let officer = scoped_submitter();
        let supervisor = Identity::new("sup-001", "Duty Supervisor", Role::Supervisor);

        assert!(policy
            .authorize(&officer, Action::Read, &report_for("MBANK001"))
            .is_ok());
        assert!(matches!(
            policy.authorize(&officer, Action::Read, &report_for("PKOBP001")),
            Err(AccessError::Forbidden { .. })
        ));
        assert!(policy
            .authorize(&supervisor, Action::Read, &report_for("PKOBP001"))
            .is_ok());
    }

    #[test]
    fn test_decision_denials_distinguish_role_from_state() {
        let policy = AccessPolicy::new();
        let officer = scoped_submitter();
        let supervisor = Identity::new("sup-001", "Duty Supervisor", Role::Supervisor);
        let mut report = report_for("MBANK001");

        // Wrong role: forbidden even though the state is also wrong.
        assert!(matches!(
            policy.authorize(&officer, Action::Approve, &report),
            Err(AccessError::Forbidden { .. })
        ));

        // Right role, wrong state: a state mismatch, not a forbidden.
        assert!(matches!(
            policy.authorize(&supervisor, Action::Approve, &report),
            Err(AccessError::InvalidState {
                required: ReportStatus::Analyzed,
                ..
            })
        ));

        report.status = ReportStatus::Analyzed;
        assert!(policy.authorize(&supervisor, Action::Approve, &report).is_ok());
        assert!(policy.authorize(&supervisor, Action::Reject, &report).is_ok());
    }
}
