//! pulse-sse: Server-sent event plumbing for the Pulse agent stream
//!
//! Turns the chunked body of a streaming `POST` into complete frames and
//! parsed `(event, data)` pairs, tolerating chunks that split lines or
//! multi-byte characters.

pub mod client;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod stream;

pub use client::{AgentClient, AgentRequest, DEFAULT_ENDPOINT};
pub use decoder::{FrameDecoder, Utf8Decoder};
pub use error::{Error, Result};
pub use frame::{SseEvent, parse_frame};
pub use stream::{ByteStream, EventStream, FrameStream, events, frames};
