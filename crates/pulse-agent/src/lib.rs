//! pulse-agent: Chat session runtime for the Pulse reasoning agent
//!
//! Interprets the agent's streamed reasoning trace (thought, action,
//! action input, observation, final answer) into a chat log and a
//! linearized transcript that is resent to the stateless backend on every turn.

pub mod conversation;
pub mod error;
pub mod events;
pub mod handle;
pub mod interpreter;
pub mod message;
pub mod session;
pub mod transcript;
pub mod transport;

pub use conversation::Conversation;
pub use error::{Error, Result};
pub use events::{SessionEvent, TurnOutcome};
pub use handle::SessionHandle;
pub use interpreter::{Interpretation, JsonPayload, interpret, parse_payload};
pub use message::{ChatMessage, EventKind, Sender};
pub use session::{ChatSession, STREAM_UNAVAILABLE};
pub use transcript::{Transcript, transcript_line};
pub use transport::{HttpTransport, Transport};
