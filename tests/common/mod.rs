// Shared test harness - wires the core against scripted capabilities
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use veritas::pipeline::mocks::{MockAssessor, MockComposer, MockValidator};
use veritas::{
    ComposedMessage, DocumentRef, DocumentValidator, FanoutRegistry, Identity,
    InMemoryReportStore, MemoryAuditSink, MessageComposer, Notifier, PipelineOrchestrator,
    PipelinePolicy, ReportService, ReportStateMachine, ReviewPolicy, RiskAssessor, RiskCategory,
    RiskOutcome, Role, ValidationOutcome,
};

pub struct Harness {
    pub store: Arc<InMemoryReportStore>,
    pub state_machine: Arc<ReportStateMachine>,
    pub registry: Arc<FanoutRegistry>,
    pub audit: Arc<MemoryAuditSink>,
    pub service: ReportService,
}

pub struct HarnessBuilder {
    validator: Arc<dyn DocumentValidator>,
    assessor: Arc<dyn RiskAssessor>,
    composer: Arc<dyn MessageComposer>,
    policy: PipelinePolicy,
    review: ReviewPolicy,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            validator: Arc::new(MockValidator::succeeding(ValidationOutcome::valid(0.97))),
            assessor: Arc::new(MockAssessor::succeeding(clean_risk())),
            composer: Arc::new(MockComposer::succeeding(ComposedMessage {
                title: "composed title".to_string(),
                body: "composed body".to_string(),
            })),
            policy: PipelinePolicy {
                supervisor_recipients: vec!["sup-001".to_string()],
                ..Default::default()
            },
            review: ReviewPolicy::default(),
        }
    }
}

impl HarnessBuilder {
    pub fn with_validator(mut self, validator: Arc<dyn DocumentValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_assessor(mut self, assessor: Arc<dyn RiskAssessor>) -> Self {
        self.assessor = assessor;
        self
    }

    pub fn with_composer(mut self, composer: Arc<dyn MessageComposer>) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_policy(mut self, mutate: impl FnOnce(&mut PipelinePolicy)) -> Self {
        mutate(&mut self.policy);
        self
    }

    pub fn build(self) -> Harness {
        let store = Arc::new(InMemoryReportStore::new());
        let state_machine = Arc::new(ReportStateMachine::new(store.clone()));
        let registry = Arc::new(FanoutRegistry::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let notifier = Arc::new(Notifier::new(
            self.composer,
            registry.clone(),
            audit.clone(),
            Duration::from_millis(250),
        ));
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            self.validator,
            self.assessor,
            state_machine.clone(),
            notifier.clone(),
            audit.clone(),
            self.policy,
        ));
        let service = ReportService::new(
            store.clone(),
            state_machine.clone(),
            orchestrator,
            notifier,
            self.review,
        );
        Harness {
            store,
            state_machine,
            registry,
            audit,
            service,
        }
    }
}

pub fn harness() -> Harness {
    HarnessBuilder::default().build()
}

pub fn builder() -> HarnessBuilder {
    HarnessBuilder::default()
}

/// A low, routine risk outcome as a healthy assessor would return it.
pub fn clean_risk() -> RiskOutcome {
    RiskOutcome::from_score(
        RiskCategory::Liquidity,
        3.2,
        Vec::new(),
        0.92,
        "ratios within expected bands".to_string(),
    )
}

pub fn officer() -> Identity {
    Identity::new("officer-001", "Entity Officer", Role::Submitter)
        .with_scope(vec!["MBANK001".to_string()])
}

pub fn supervisor() -> Identity {
    Identity::new("sup-001", "Duty Supervisor", Role::Supervisor)
}

pub fn administrator() -> Identity {
    Identity::new("admin-001", "Platform Admin", Role::Administrator)
}

pub fn document() -> DocumentRef {
    DocumentRef::new("q3-liquidity.xlsx", 48_128)
}
