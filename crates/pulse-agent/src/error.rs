//! Error types for pulse-agent

use thiserror::Error;

/// Result type alias using pulse-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a chat turn
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the stream layer
    #[error(transparent)]
    Sse(#[from] pulse_sse::Error),

    /// The turn was cancelled before the stream opened
    #[error("Turn cancelled")]
    Cancelled,
}
