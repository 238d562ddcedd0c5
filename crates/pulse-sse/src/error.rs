//! Error types for pulse-sse

use thiserror::Error;

/// Result type alias using pulse-sse Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while opening or reading the agent stream
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server answered with a non-success status before streaming began
    #[error("Agent endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Endpoint could not be turned into a request URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// No response arrived within the configured timeout
    #[error("Timed out after {0:?} waiting for the agent to respond")]
    Timeout(std::time::Duration),

    /// The byte stream failed after it had started
    #[error("Stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Create a status error from a status code and response body
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Whether this failure happened before any event could be read.
    ///
    /// Everything except [`Error::Stream`] is raised while the request is
    /// being opened.
    pub fn is_before_stream(&self) -> bool {
        !matches!(self, Error::Stream(_))
    }

    /// Whether the server rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Status { status: 401, .. })
    }
}
