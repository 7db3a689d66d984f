//! Inter-agent notifications.
//!
//! Messages are append-only observational data: they are logged for
//! auditability and never read back to alter control flow. Cross-step data
//! relay goes through the explicit hint fields on the context instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::StepName;

/// Kind of inter-agent notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Context,
    Insight,
    Question,
    Answer,
}

/// A notification emitted by one step agent towards another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    pub from_step: StepName,
    pub to_step: StepName,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    /// Creates a new message stamped with the current time.
    pub fn new(
        from_step: StepName,
        to_step: StepName,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> Self {
        Self {
            from_step,
            to_step,
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a context-sharing message.
    pub fn context(from_step: StepName, to_step: StepName, content: impl Into<String>) -> Self {
        Self::new(from_step, to_step, MessageKind::Context, content)
    }
}
