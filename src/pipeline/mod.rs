// Assessment pipeline: capability ports, fallback policy, orchestration,
// and the audit trail for absorbed failures

pub mod audit;
pub mod capability;
pub mod fallback;
pub mod mocks;
pub mod orchestrator;

pub use audit::{AuditEvent, AuditSink, MemoryAuditSink, PipelineStage, TracingAuditSink};
pub use capability::{
    CapabilityError, ComposedMessage, DocumentValidator, MessageComposer, RiskAssessor,
};
pub use orchestrator::{PipelineOrchestrator, PipelineOutcome, PipelinePolicy};
