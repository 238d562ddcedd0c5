//! Session event types

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// How a turn ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The server sent `done`
    Completed,
    /// The stream closed without `done`, cleanly or not
    Ended,
    /// The request failed before streaming began
    Failed,
    /// The turn was cancelled or superseded by a newer send
    Cancelled,
}

/// Events emitted while a session runs, for progressive rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A user turn was accepted
    TurnStart { turn: u64, input: String },

    /// A message was appended to the log
    MessageAppended { turn: u64, message: ChatMessage },

    /// The server reported an `error` event
    ServerError { turn: u64, message: String },

    /// The loading flag changed
    LoadingChanged { loading: bool },

    /// A turn finished
    TurnEnd { turn: u64, outcome: TurnOutcome },
}

impl SessionEvent {
    /// Check if this is a terminal event for a turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionEvent::TurnEnd { .. })
    }
}
