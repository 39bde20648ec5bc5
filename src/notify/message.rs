// Notification payloads pushed to live channels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Workflow events that produce notifications. Fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Submitted,
    Approved,
    Rejected,
    ValidationFailed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form context attached to a message, keyed by field name.
pub type MessageContext = HashMap<String, serde_json::Value>;

/// A notification as delivered to a live channel. Created once, never
/// mutated, delivered at most once per channel; there is no durable
/// redelivery for recipients without a live channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub recipient: String,
    pub title: String,
    pub body: String,
    pub kind: EventKind,
    pub context: MessageContext,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(
        recipient: impl Into<String>,
        kind: EventKind,
        title: impl Into<String>,
        body: impl Into<String>,
        context: MessageContext,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            title: title.into(),
            body: body.into(),
            kind,
            context,
            created_at: Utc::now(),
        }
    }
}
