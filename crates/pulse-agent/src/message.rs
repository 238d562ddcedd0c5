//! Chat message types shown to the user

use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    /// Role label used in the transcript
    pub fn role(&self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Agent => "Agent",
        }
    }
}

/// Which step of the agent's reasoning trace a message carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Thought,
    Action,
    ActionInput,
    Observation,
    Final,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Thought => "thought",
            EventKind::Action => "action",
            EventKind::ActionInput => "action_input",
            EventKind::Observation => "observation",
            EventKind::Final => "final",
        }
    }

    /// Human-readable heading for this step
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Thought => "Thought",
            EventKind::Action => "Action",
            EventKind::ActionInput => "Action Input",
            EventKind::Observation => "Observation",
            EventKind::Final => "Answer",
        }
    }
}

/// One entry in the chat log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display text (plain text or pretty-printed JSON)
    pub text: String,
    pub sender: Sender,
    /// Reasoning step, only set on streamed agent messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventKind>,
    /// Parsed JSON payload when the event carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Unix timestamp (ms) when the message was appended
    pub timestamp: i64,
}

impl ChatMessage {
    /// A message typed by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, None)
    }

    /// A streamed step of the agent's trace
    pub fn agent(kind: EventKind, text: impl Into<String>) -> Self {
        Self::new(text, Sender::Agent, Some(kind))
    }

    /// An agent-side notice that is not part of the trace (e.g. a failed turn)
    pub fn fallback(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Agent, None)
    }

    /// Attach a parsed payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    fn new(text: impl Into<String>, sender: Sender, kind: Option<EventKind>) -> Self {
        Self {
            text: text.into(),
            sender,
            kind,
            data: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Whether this is the agent's final answer
    pub fn is_final(&self) -> bool {
        self.kind == Some(EventKind::Final)
    }
}
