// Veritas Library - Supervised Financial-Report Assessment Pipeline
// This exposes the core components for testing and integration

pub mod access;
pub mod config;
pub mod error;
pub mod identity;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod service;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use access::{AccessError, AccessPolicy, Action};
pub use config::{config, init_config, VeritasConfig};
pub use error::CoreError;
pub use identity::{Identity, Role};
pub use notify::{ChannelId, EventKind, FanoutRegistry, Message, MessageContext, Notifier};
pub use pipeline::{
    AuditEvent, AuditSink, CapabilityError, ComposedMessage, DocumentValidator, MemoryAuditSink,
    MessageComposer, PipelineOrchestrator, PipelineOutcome, PipelinePolicy, PipelineStage,
    RiskAssessor, TracingAuditSink,
};
pub use report::{
    DocumentRef, Report, ReportKind, ReportStateMachine, ReportStatus, ReviewDecision,
    RiskCategory, RiskLevel, RiskOutcome, StructuralError, TransitionError, Urgency,
    ValidationOutcome,
};
pub use service::{ListFilter, ReportService, ReviewPolicy};
pub use store::{InMemoryReportStore, ReportFilter, ReportStore, StoreError};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
