//! Mapping of named stream events onto chat messages and transcript lines

use pulse_sse::SseEvent;
use serde_json::Value;

use crate::{
    message::{ChatMessage, EventKind},
    transcript::transcript_line,
};

/// Outcome of decoding a JSON event payload
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPayload {
    Parsed(Value),
    Malformed(String),
}

/// Parse a JSON payload. An empty payload reads as `{}`.
pub fn parse_payload(data: &str) -> JsonPayload {
    let data = if data.trim().is_empty() { "{}" } else { data };
    match serde_json::from_str(data) {
        Ok(value) => JsonPayload::Parsed(value),
        Err(e) => JsonPayload::Malformed(e.to_string()),
    }
}

/// What the session should do with one event
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// Append a message to the log and a line to the transcript
    Append {
        message: ChatMessage,
        transcript_line: String,
    },
    /// Server-reported error; diagnostic only
    Error(String),
    /// Server finished the turn
    Done,
    /// JSON payload could not be used; dropped without side effects
    Malformed { event: String, reason: String },
    /// Unrecognized event name
    Ignored { event: String },
}

impl Interpretation {
    fn append(message: ChatMessage, transcript_text: &str) -> Self {
        let transcript_line = transcript_line(message.sender, message.kind, transcript_text);
        Interpretation::Append {
            message,
            transcript_line,
        }
    }

    fn malformed(event: &str, reason: impl Into<String>) -> Self {
        Interpretation::Malformed {
            event: event.to_string(),
            reason: reason.into(),
        }
    }
}

/// Interpret one event. Pure: no I/O and no shared state.
pub fn interpret(event: &SseEvent) -> Interpretation {
    let data = event.data.as_str();

    match event.event.as_str() {
        "thought" => Interpretation::append(ChatMessage::agent(EventKind::Thought, data), data),
        "observation" => {
            Interpretation::append(ChatMessage::agent(EventKind::Observation, data), data)
        }
        "final_answer" => Interpretation::append(ChatMessage::agent(EventKind::Final, data), data),
        "action" => match parse_payload(data) {
            JsonPayload::Parsed(value) => match value.get("name").and_then(action_name) {
                Some(name) => Interpretation::append(
                    ChatMessage::agent(EventKind::Action, format!("Action: {}", name)),
                    &name,
                ),
                None => Interpretation::malformed("action", "missing scalar field `name`"),
            },
            JsonPayload::Malformed(reason) => Interpretation::malformed("action", reason),
        },
        "action_input" => match parse_payload(data) {
            JsonPayload::Parsed(value) => {
                let pretty =
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| data.to_string());
                let compact = value.to_string();
                Interpretation::append(
                    ChatMessage::agent(EventKind::ActionInput, pretty).with_data(value),
                    &compact,
                )
            }
            JsonPayload::Malformed(reason) => Interpretation::malformed("action_input", reason),
        },
        "error" => Interpretation::Error(data.to_string()),
        "done" => Interpretation::Done,
        other => Interpretation::Ignored {
            event: other.to_string(),
        },
    }
}

/// Tool name of an `action` payload. Strings are used as-is, numbers and
/// booleans in their JSON form; `null` and containers carry no name.
fn action_name(name: &Value) -> Option<String> {
    match name {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(name.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;

    fn appended(event: &str, data: &str) -> (ChatMessage, String) {
        match interpret(&SseEvent::new(event, data)) {
            Interpretation::Append {
                message,
                transcript_line,
            } => (message, transcript_line),
            other => panic!("expected append, got {:?}", other),
        }
    }

    #[test]
    fn test_thought() {
        let (msg, line) = appended("thought", "checking");
        assert_eq!(msg.kind, Some(EventKind::Thought));
        assert_eq!(msg.sender, Sender::Agent);
        assert_eq!(msg.text, "checking");
        assert_eq!(line, "Agent (thought): checking");
    }

    #[test]
    fn test_action_name_extraction() {
        let (msg, line) = appended("action", r#"{"name":"search"}"#);
        assert_eq!(msg.kind, Some(EventKind::Action));
        assert_eq!(msg.text, "Action: search");
        assert_eq!(line, "Agent (action): search");
    }

    #[test]
    fn test_action_malformed_json_dropped() {
        let result = interpret(&SseEvent::new("action", "{not json}"));
        assert!(matches!(result, Interpretation::Malformed { ref event, .. } if event == "action"));
    }

    #[test]
    fn test_action_scalar_name_rendered() {
        let (msg, line) = appended("action", r#"{"name":42}"#);
        assert_eq!(msg.text, "Action: 42");
        assert_eq!(line, "Agent (action): 42");

        let (msg, _) = appended("action", r#"{"name":true}"#);
        assert_eq!(msg.text, "Action: true");
    }

    #[test]
    fn test_action_null_or_nested_name_dropped() {
        for data in [r#"{"name":null}"#, r#"{"name":["a"]}"#, r#"{"name":{"x":1}}"#] {
            assert!(
                matches!(
                    interpret(&SseEvent::new("action", data)),
                    Interpretation::Malformed { .. }
                ),
                "{}",
                data
            );
        }
    }

    #[test]
    fn test_action_without_name_dropped() {
        assert!(matches!(
            interpret(&SseEvent::new("action", r#"{"tool":"search"}"#)),
            Interpretation::Malformed { .. }
        ));
        assert!(matches!(
            interpret(&SseEvent::new("action", "")),
            Interpretation::Malformed { .. }
        ));
    }

    #[test]
    fn test_action_input_pretty_and_compact() {
        let (msg, line) = appended("action_input", r#"{"type":"run","minutes":30}"#);
        assert_eq!(msg.kind, Some(EventKind::ActionInput));
        assert_eq!(msg.text, "{\n  \"type\": \"run\",\n  \"minutes\": 30\n}");
        assert_eq!(
            msg.data,
            Some(serde_json::json!({"type": "run", "minutes": 30}))
        );
        assert_eq!(line, r#"Agent (action_input): {"type":"run","minutes":30}"#);
    }

    #[test]
    fn test_action_input_scalar_payload() {
        let (msg, line) = appended("action_input", "\"all\"");
        assert_eq!(msg.text, "\"all\"");
        assert_eq!(line, "Agent (action_input): \"all\"");
    }

    #[test]
    fn test_action_input_empty_reads_as_object() {
        let (msg, line) = appended("action_input", "");
        assert_eq!(msg.text, "{}");
        assert_eq!(line, "Agent (action_input): {}");
    }

    #[test]
    fn test_action_input_malformed_dropped() {
        assert!(matches!(
            interpret(&SseEvent::new("action_input", "{\"a\":")),
            Interpretation::Malformed { .. }
        ));
    }

    #[test]
    fn test_observation() {
        let (msg, line) = appended("observation", "3 activities found");
        assert_eq!(msg.kind, Some(EventKind::Observation));
        assert_eq!(line, "Agent (observation): 3 activities found");
    }

    #[test]
    fn test_final_answer() {
        let (msg, line) = appended("final_answer", "done");
        assert!(msg.is_final());
        assert_eq!(msg.text, "done");
        assert_eq!(line, "Agent: done");
    }

    #[test]
    fn test_control_events() {
        assert_eq!(
            interpret(&SseEvent::new("error", "tool crashed")),
            Interpretation::Error("tool crashed".into())
        );
        assert_eq!(interpret(&SseEvent::new("done", "")), Interpretation::Done);
    }

    #[test]
    fn test_unknown_and_default_events_ignored() {
        assert_eq!(
            interpret(&SseEvent::new("message", "hello")),
            Interpretation::Ignored {
                event: "message".into()
            }
        );
        assert!(matches!(
            interpret(&SseEvent::new("ping", "")),
            Interpretation::Ignored { .. }
        ));
    }

    #[test]
    fn test_parse_payload() {
        assert_eq!(parse_payload("  "), JsonPayload::Parsed(serde_json::json!({})));
        assert!(matches!(parse_payload("nope"), JsonPayload::Malformed(_)));
    }
}
