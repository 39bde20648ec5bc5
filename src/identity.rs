// Caller identity as supplied by the external authentication collaborator

use serde::{Deserialize, Serialize};

/// Caller role. Assigned by the identity provider; opaque and immutable for
/// the duration of a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Files reports for the entities in their scope.
    Submitter,
    /// Reviews and decides on any report; never submits.
    Supervisor,
    /// Full access, including everything a supervisor can do.
    Administrator,
}

/// Authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    /// Entity references this identity may act on. An entry of `"*"` grants
    /// access to every entity.
    pub entity_scope: Vec<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            role,
            entity_scope: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: Vec<String>) -> Self {
        self.entity_scope = scope;
        self
    }

    /// Supervisors and administrators see every entity; submitters are bound
    /// to their scope.
    pub fn can_access_entity(&self, entity_ref: &str) -> bool {
        match self.role {
            Role::Supervisor | Role::Administrator => true,
            Role::Submitter => self
                .entity_scope
                .iter()
                .any(|scoped| scoped == "*" || scoped == entity_ref),
        }
    }

    pub fn is_reviewer(&self) -> bool {
        matches!(self.role, Role::Supervisor | Role::Administrator)
    }

    /// True when the scope places no entity restriction on listings.
    pub fn has_unrestricted_scope(&self) -> bool {
        self.is_reviewer() || self.entity_scope.iter().any(|scoped| scoped == "*")
    }
}
