// Compose-with-fallback and publish - the single notification path
//
// Everything here is best-effort: a compose failure is absorbed into the
// fixed-language generic text and audited, and publishing never errors back
// to the caller. No workflow step fails because a notification could not be
// produced or delivered.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::pipeline::audit::{AuditEvent, AuditSink, PipelineStage};
use crate::pipeline::capability::{CapabilityError, ComposedMessage, MessageComposer};
use crate::pipeline::fallback;

use super::message::{EventKind, Message, MessageContext};
use super::registry::FanoutRegistry;

/// Composes notification text through the Compose capability and publishes
/// the result to the recipients' live channels.
pub struct Notifier {
    composer: Arc<dyn MessageComposer>,
    registry: Arc<FanoutRegistry>,
    audit: Arc<dyn AuditSink>,
    compose_timeout: Duration,
}

impl Notifier {
    pub fn new(
        composer: Arc<dyn MessageComposer>,
        registry: Arc<FanoutRegistry>,
        audit: Arc<dyn AuditSink>,
        compose_timeout: Duration,
    ) -> Self {
        Self {
            composer,
            registry,
            audit,
            compose_timeout,
        }
    }

    /// Composes and publishes one message, returning what went out so
    /// callers and tests can observe it.
    pub async fn notify(
        &self,
        report_id: Uuid,
        recipient: &str,
        event: EventKind,
        context: MessageContext,
    ) -> Message {
        let composed = self.compose_or_fallback(report_id, event, &context).await;
        let message = Message::new(recipient, event, composed.title, composed.body, context);
        debug!(
            report_id = %report_id,
            recipient = %recipient,
            kind = %event,
            message_id = %message.id,
            "notification published"
        );
        self.registry.publish(message.clone()).await;
        message
    }

    /// Composes once for a whole recipient class and publishes one message
    /// per member, so a supervisor pool costs a single compose call.
    pub async fn notify_class(
        &self,
        report_id: Uuid,
        recipients: &[String],
        event: EventKind,
        context: MessageContext,
    ) -> Vec<Message> {
        if recipients.is_empty() {
            return Vec::new();
        }
        let composed = self.compose_or_fallback(report_id, event, &context).await;
        let mut published = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let message = Message::new(
                recipient,
                event,
                composed.title.clone(),
                composed.body.clone(),
                context.clone(),
            );
            self.registry.publish(message.clone()).await;
            published.push(message);
        }
        published
    }

    async fn compose_or_fallback(
        &self,
        report_id: Uuid,
        event: EventKind,
        context: &MessageContext,
    ) -> ComposedMessage {
        match timeout(self.compose_timeout, self.composer.compose(event, context)).await {
            Ok(Ok(composed)) => composed,
            Ok(Err(err)) => self.absorb_compose_failure(report_id, event, err),
            Err(_) => self.absorb_compose_failure(
                report_id,
                event,
                CapabilityError::TimedOut(self.compose_timeout),
            ),
        }
    }

    fn absorb_compose_failure(
        &self,
        report_id: Uuid,
        event: EventKind,
        err: CapabilityError,
    ) -> ComposedMessage {
        warn!(
            report_id = %report_id,
            kind = %event,
            error = %err,
            "compose failed, substituting generic message"
        );
        self.audit.record(AuditEvent::CapabilityFailed {
            report_id,
            stage: PipelineStage::Compose,
            error: err.to_string(),
            at: chrono::Utc::now(),
        });
        self.audit.record(AuditEvent::FallbackApplied {
            report_id,
            stage: PipelineStage::Compose,
            at: chrono::Utc::now(),
        });
        fallback::generic_message(event)
    }
}
