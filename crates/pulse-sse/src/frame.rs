//! Parsing of a single SSE frame into an event name and data payload

use serde::{Deserialize, Serialize};

/// One named event read from the stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SseEvent {
    /// Event name from the `event:` field
    pub event: String,
    /// `data:` lines joined with `\n`
    pub data: String,
}

impl SseEvent {
    /// Event name used when a frame has no `event:` line
    pub const DEFAULT_EVENT: &'static str = "message";

    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

/// Parse one raw frame (the text between two blank-line separators).
///
/// `event:` values are trimmed and the last one wins. Each `data:` line
/// contributes its value with a single leading space removed. Anything else
/// (comments, `id:`, `retry:`) is ignored.
pub fn parse_frame(frame: &str) -> SseEvent {
    let mut event: Option<&str> = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    SseEvent {
        event: event.unwrap_or(SseEvent::DEFAULT_EVENT).to_string(),
        data: data_lines.join("\n"),
    }
}
