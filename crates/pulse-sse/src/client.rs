//! HTTP client for the streaming agent endpoint

use std::time::Duration;

use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    stream::ByteStream,
};

/// Default agent endpoint of a local development backend
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5001/agent";

/// Request body for one user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    /// The new user input
    pub input: String,
    /// Linearized conversation so far, including this turn's user line
    pub chat_history: String,
}

impl AgentRequest {
    pub fn new(input: impl Into<String>, chat_history: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            chat_history: chat_history.into(),
        }
    }
}

/// Client that opens the agent's event stream over a POST request
#[derive(Debug, Clone)]
pub struct AgentClient {
    client: reqwest::Client,
    endpoint: String,
    bearer_token: Option<String>,
    connect_timeout: Option<Duration>,
}

impl AgentClient {
    /// Create a client for an agent endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            bearer_token: None,
            connect_timeout: None,
        }
    }

    /// Attach a bearer token to every request
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Bound how long opening the stream may take.
    ///
    /// Only the wait for response headers is limited; a long-running stream
    /// is never cut off.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// The configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the streaming URL (`<endpoint>?stream=true`)
    pub fn stream_url(&self) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;
        url.query_pairs_mut().append_pair("stream", "true");
        Ok(url)
    }

    /// Send one turn and return the response body as a byte stream
    pub async fn open(&self, request: &AgentRequest) -> Result<ByteStream> {
        let url = self.stream_url()?;

        let mut builder = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(request)?);

        if let Some(ref token) = self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let send = builder.send();
        let response = match self.connect_timeout {
            Some(timeout) => send_with_timeout(timeout, send).await?,
            None => send.await?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "agent endpoint rejected request");
            return Err(Error::status(status.as_u16(), body));
        }

        tracing::debug!(status = %status, "agent stream opened");

        let bytes = response.bytes_stream().map(|chunk| {
            chunk
                .map(|b| b.to_vec())
                .map_err(|e| Error::Stream(e.to_string()))
        });

        Ok(Box::pin(bytes))
    }
}

impl Default for AgentClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

async fn send_with_timeout<F>(timeout: Duration, send: F) -> Result<reqwest::Response>
where
    F: std::future::Future<Output = reqwest::Result<reqwest::Response>>,
{
    match tokio::time::timeout(timeout, send).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::Timeout(timeout)),
    }
}
