//! Linearized conversation history sent back to the server each turn

use serde::{Deserialize, Serialize};

use crate::message::{EventKind, Sender};

/// Format one transcript line: `<Role>[ (<kind>)]: <text>`.
///
/// Final answers are written without a kind, as a plain `Agent:` line.
pub fn transcript_line(sender: Sender, kind: Option<EventKind>, text: &str) -> String {
    match kind {
        Some(EventKind::Final) | None => format!("{}: {}", sender.role(), text),
        Some(kind) => format!("{} ({}): {}", sender.role(), kind.as_str(), text),
    }
}

/// Append-only, newline-joined history of the conversation.
///
/// The backend keeps no session state, so the whole transcript is resent
/// with every user turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a preformatted line
    pub fn push_line(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    /// Append a `User: <input>` line
    pub fn push_user(&mut self, input: &str) {
        self.push_line(&transcript_line(Sender::User, None, input));
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Owned copy to put on the wire
    pub fn snapshot(&self) -> String {
        self.text.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines. Multi-line payloads count once per embedded newline.
    pub fn len_lines(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.lines().count()
        }
    }
}

impl std::fmt::Display for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
