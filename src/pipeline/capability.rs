// Capability ports - black-box operations the orchestrator never trusts

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::notify::{EventKind, MessageContext};
use crate::report::{DocumentRef, RiskOutcome, ValidationOutcome};

/// How a capability call failed. Never surfaced past the pipeline: the
/// fallback policy absorbs both variants into a degraded outcome.
#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("capability failed: {0}")]
    Failed(String),
    #[error("capability timed out after {0:?}")]
    TimedOut(Duration),
}

/// Title and body produced by the Compose capability. The dispatcher adds
/// recipient, event kind, context and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub title: String,
    pub body: String,
}

/// Structural validation of a submitted document.
#[async_trait]
pub trait DocumentValidator: Send + Sync {
    async fn validate(&self, document: &DocumentRef) -> Result<ValidationOutcome, CapabilityError>;
}

/// Risk analysis over a document and its (real or fallback) validation
/// outcome. Runs regardless of the validity flag.
#[async_trait]
pub trait RiskAssessor: Send + Sync {
    async fn assess(
        &self,
        document: &DocumentRef,
        validation: &ValidationOutcome,
    ) -> Result<RiskOutcome, CapabilityError>;
}

/// Notification text generation for a workflow event.
#[async_trait]
pub trait MessageComposer: Send + Sync {
    async fn compose(
        &self,
        event: EventKind,
        context: &MessageContext,
    ) -> Result<ComposedMessage, CapabilityError>;
}
