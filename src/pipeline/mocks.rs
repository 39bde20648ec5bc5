// Mock and stub capabilities - no external calls
//
// The Mock* types are scripted test doubles that record their invocations.
// The deterministic stand-ins at the bottom back the demo binary.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::notify::{EventKind, MessageContext};
use crate::report::{
    DocumentRef, RiskCategory, RiskOutcome, StructuralError, ValidationOutcome,
};

use super::capability::{
    CapabilityError, ComposedMessage, DocumentValidator, MessageComposer, RiskAssessor,
};

/// Scripted response shared by the mock capabilities.
#[derive(Debug, Clone)]
enum MockResponse<T> {
    Succeed(T),
    Fail(String),
    /// Sleeps before answering; pair with a shorter pipeline timeout to
    /// exercise the timeout path.
    Hang(Duration, T),
}

/// Scripted validator recording the file names it was asked to validate.
pub struct MockValidator {
    response: MockResponse<ValidationOutcome>,
    calls: Mutex<Vec<String>>,
}

impl MockValidator {
    pub fn succeeding(outcome: ValidationOutcome) -> Self {
        Self {
            response: MockResponse::Succeed(outcome),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            response: MockResponse::Fail(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn hanging(delay: Duration, outcome: ValidationOutcome) -> Self {
        Self {
            response: MockResponse::Hang(delay, outcome),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentValidator for MockValidator {
    async fn validate(&self, document: &DocumentRef) -> Result<ValidationOutcome, CapabilityError> {
        self.calls.lock().unwrap().push(document.file_name.clone());
        match self.response.clone() {
            MockResponse::Succeed(outcome) => Ok(outcome),
            MockResponse::Fail(reason) => Err(CapabilityError::Failed(reason)),
            MockResponse::Hang(delay, outcome) => {
                tokio::time::sleep(delay).await;
                Ok(outcome)
            }
        }
    }
}

/// Scripted assessor recording (file name, validity flag) per call. With
/// [`MockAssessor::scripted`] each call pops the next outcome; the last one
/// repeats once the script runs out.
pub struct MockAssessor {
    response: MockResponse<RiskOutcome>,
    script: Mutex<Vec<RiskOutcome>>,
    calls: Mutex<Vec<(String, bool)>>,
}

impl MockAssessor {
    pub fn succeeding(outcome: RiskOutcome) -> Self {
        Self {
            response: MockResponse::Succeed(outcome),
            script: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            response: MockResponse::Fail(reason.to_string()),
            script: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn hanging(delay: Duration, outcome: RiskOutcome) -> Self {
        Self {
            response: MockResponse::Hang(delay, outcome),
            script: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn scripted(mut outcomes: Vec<RiskOutcome>) -> Self {
        let last = outcomes
            .last()
            .cloned()
            .unwrap_or_else(|| RiskOutcome::from_score(
                RiskCategory::Unknown,
                0.0,
                Vec::new(),
                0.0,
                "empty script".to_string(),
            ));
        outcomes.reverse();
        Self {
            response: MockResponse::Succeed(last),
            script: Mutex::new(outcomes),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RiskAssessor for MockAssessor {
    async fn assess(
        &self,
        document: &DocumentRef,
        validation: &ValidationOutcome,
    ) -> Result<RiskOutcome, CapabilityError> {
        self.calls
            .lock()
            .unwrap()
            .push((document.file_name.clone(), validation.is_valid));
        if let Some(next) = self.script.lock().unwrap().pop() {
            return Ok(next);
        }
        match self.response.clone() {
            MockResponse::Succeed(outcome) => Ok(outcome),
            MockResponse::Fail(reason) => Err(CapabilityError::Failed(reason)),
            MockResponse::Hang(delay, outcome) => {
                tokio::time::sleep(delay).await;
                Ok(outcome)
            }
        }
    }
}

/// Scripted composer recording the event kinds it was asked about.
pub struct MockComposer {
    response: MockResponse<ComposedMessage>,
    calls: Mutex<Vec<EventKind>>,
}

impl MockComposer {
    pub fn succeeding(message: ComposedMessage) -> Self {
        Self {
            response: MockResponse::Succeed(message),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            response: MockResponse::Fail(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<EventKind> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageComposer for MockComposer {
    async fn compose(
        &self,
        event: EventKind,
        _context: &MessageContext,
    ) -> Result<ComposedMessage, CapabilityError> {
        self.calls.lock().unwrap().push(event);
        match self.response.clone() {
            MockResponse::Succeed(message) => Ok(message),
            MockResponse::Fail(reason) => Err(CapabilityError::Failed(reason)),
            MockResponse::Hang(delay, message) => {
                tokio::time::sleep(delay).await;
                Ok(message)
            }
        }
    }
}

/// Deterministic validator for the demo binary: checks the reference shape
/// instead of calling out.
#[derive(Debug, Default)]
pub struct HeuristicValidator;

#[async_trait]
impl DocumentValidator for HeuristicValidator {
    async fn validate(&self, document: &DocumentRef) -> Result<ValidationOutcome, CapabilityError> {
        let mut errors = Vec::new();
        if !document.file_name.ends_with(".xlsx") {
            errors.push(StructuralError {
                field: "file_name".to_string(),
                row: None,
                issue: "expected an .xlsx workbook".to_string(),
            });
        }
        if document.size_bytes == 0 {
            errors.push(StructuralError {
                field: "file_size".to_string(),
                row: None,
                issue: "document is empty".to_string(),
            });
        }
        let mut outcome = if errors.is_empty() {
            ValidationOutcome::valid(0.95)
        } else {
            ValidationOutcome::invalid(0.95, errors)
        };
        if document.size_bytes > 10 * 1024 * 1024 {
            outcome
                .warnings
                .push("unusually large workbook".to_string());
        }
        Ok(outcome)
    }
}

/// Deterministic assessor for the demo binary: scores from the document size
/// so repeated runs agree.
#[derive(Debug, Default)]
pub struct HeuristicAssessor;

#[async_trait]
impl RiskAssessor for HeuristicAssessor {
    async fn assess(
        &self,
        document: &DocumentRef,
        validation: &ValidationOutcome,
    ) -> Result<RiskOutcome, CapabilityError> {
        let mut score = (document.size_bytes % 80) as f64 / 10.0;
        let mut anomalies = Vec::new();
        if !validation.is_valid {
            score += 1.5;
            anomalies.push("document failed structural validation".to_string());
        }
        Ok(RiskOutcome::from_score(
            RiskCategory::Operational,
            score,
            anomalies,
            0.9,
            format!(
                "deterministic demo assessment of {} ({} bytes)",
                document.file_name, document.size_bytes
            ),
        ))
    }
}

/// Template-based composer for the demo binary.
#[derive(Debug, Default)]
pub struct TemplateComposer;

impl TemplateComposer {
    fn context_str<'a>(context: &'a MessageContext, key: &str) -> &'a str {
        context
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or("(unknown)")
    }
}

#[async_trait]
impl MessageComposer for TemplateComposer {
    async fn compose(
        &self,
        event: EventKind,
        context: &MessageContext,
    ) -> Result<ComposedMessage, CapabilityError> {
        let entity = Self::context_str(context, "entity_name");
        let file = Self::context_str(context, "file_name");
        let (title, body) = match event {
            EventKind::Submitted => (
                format!("New report from {entity}"),
                format!("{file} has been submitted and assessed; it is waiting for review."),
            ),
            EventKind::Approved => (
                "Report approved".to_string(),
                format!("Your report {file} has been approved. Thank you for filing on time."),
            ),
            EventKind::Rejected => (
                "Report rejected".to_string(),
                format!("Your report {file} needs corrections. Check the reviewer comment and resubmit."),
            ),
            EventKind::ValidationFailed => (
                "Report validation issues".to_string(),
                format!("Structural problems were found in {file}. Review the listed errors and resubmit."),
            ),
        };
        Ok(ComposedMessage { title, body })
    }
}
