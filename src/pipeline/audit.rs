// Append-only audit trail for absorbed failures
//
// Capability failures are never surfaced to callers, so this trail is the
// only place they remain visible. The sink is injected into the orchestrator
// at construction and lives for the process, not behind a module-level
// global.

use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

/// Pipeline stage names used in audit records and tracing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validate,
    Assess,
    Compose,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Assess => "assess",
            Self::Compose => "compose",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited incident.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// A capability call errored or timed out.
    CapabilityFailed {
        report_id: Uuid,
        stage: PipelineStage,
        error: String,
        at: DateTime<Utc>,
    },
    /// A degraded outcome was attached in place of a real one.
    FallbackApplied {
        report_id: Uuid,
        stage: PipelineStage,
        at: DateTime<Utc>,
    },
    /// A capability failure escalated to a terminal failed state
    /// (configuration-gated).
    Escalated {
        report_id: Uuid,
        stage: PipelineStage,
        at: DateTime<Utc>,
    },
}

impl AuditEvent {
    pub fn report_id(&self) -> Uuid {
        match self {
            Self::CapabilityFailed { report_id, .. }
            | Self::FallbackApplied { report_id, .. }
            | Self::Escalated { report_id, .. } => *report_id,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::CapabilityFailed { stage, .. }
            | Self::FallbackApplied { stage, .. }
            | Self::Escalated { stage, .. } => *stage,
        }
    }
}

/// Append-only audit sink.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Default sink: each incident becomes a structured tracing event.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        match &event {
            AuditEvent::CapabilityFailed {
                report_id,
                stage,
                error,
                ..
            } => {
                warn!(report_id = %report_id, stage = %stage, error = %error, "capability failed");
            }
            AuditEvent::FallbackApplied { report_id, stage, .. } => {
                warn!(report_id = %report_id, stage = %stage, "fallback outcome applied");
            }
            AuditEvent::Escalated { report_id, stage, .. } => {
                warn!(report_id = %report_id, stage = %stage, "capability failure escalated to terminal state");
            }
        }
    }
}

/// Test sink retaining every event in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn failures_for(&self, stage: PipelineStage) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, AuditEvent::CapabilityFailed { .. }) && e.stage() == stage)
            .count()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}
