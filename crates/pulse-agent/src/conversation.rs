//! Conversation state: message log, transcript and loading status.

use serde::{Deserialize, Serialize};

use crate::{message::ChatMessage, transcript::Transcript};

/// Conversation state owned by a chat session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    /// Messages in arrival order
    pub messages: Vec<ChatMessage>,
    /// History resent to the server on every turn
    pub transcript: Transcript,
    /// Whether a turn is waiting on the agent
    pub is_loading: bool,
    /// Last `error` event reported by the server
    pub last_error: Option<String>,
}

impl Conversation {
    /// The most recent final answer, if any
    pub fn last_answer(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.is_final())
    }
}
