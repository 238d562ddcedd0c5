//! Transport abstraction for opening the agent stream

use async_trait::async_trait;
use pulse_sse::{AgentClient, AgentRequest, ByteStream};

use crate::error::Result;

/// Opens the byte stream for one turn
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the response body once streaming can begin
    async fn open(&self, request: AgentRequest) -> Result<ByteStream>;
}

/// HTTP transport backed by [`AgentClient`]
pub struct HttpTransport {
    client: AgentClient,
}

impl HttpTransport {
    pub fn new(client: AgentClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AgentClient {
        &self.client
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(AgentClient::default())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: AgentRequest) -> Result<ByteStream> {
        tracing::debug!(
            endpoint = self.client.endpoint(),
            history_len = request.chat_history.len(),
            "opening agent stream"
        );
        Ok(self.client.open(&request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatSession, EventKind, TurnOutcome};
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_session_over_http() {
        let server = MockServer::start().await;
        let body = concat!(
            "event: thought\ndata: I should list the runs\n\n",
            "event: action\ndata: {\"name\":\"list_activities\"}\n\n",
            "event: action_input\ndata: {\"type\":\"run\"}\n\n",
            "event: observation\ndata: 2 runs\n\n",
            "event: final_answer\ndata: You ran twice.\n\n",
            "event: done\ndata: \n\n",
        );
        Mock::given(method("POST"))
            .and(path("/agent"))
            .and(query_param("stream", "true"))
            .and(body_json(serde_json::json!({
                "input": "how many runs?",
                "chat_history": "User: how many runs?"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(AgentClient::new(format!("{}/agent", server.uri())));
        let session = ChatSession::new(Arc::new(transport));

        let outcome = session.send("how many runs?").await;

        assert_eq!(outcome, Some(TurnOutcome::Completed));
        let conv = session.snapshot();
        assert_eq!(conv.messages.len(), 6);
        assert_eq!(conv.messages[2].kind, Some(EventKind::Action));
        assert_eq!(
            conv.transcript.as_str(),
            "User: how many runs?\n\
             Agent (thought): I should list the runs\n\
             Agent (action): list_activities\n\
             Agent (action_input): {\"type\":\"run\"}\n\
             Agent (observation): 2 runs\n\
             Agent: You ran twice."
        );
    }

    #[tokio::test]
    async fn test_rejected_request_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(
            AgentClient::new(format!("{}/agent", server.uri())).with_bearer_token("stale"),
        );
        let session = ChatSession::new(Arc::new(transport));

        assert_eq!(session.send("hi").await, Some(TurnOutcome::Failed));
        assert_eq!(
            session.snapshot().messages.last().map(|m| m.text.as_str()),
            Some(crate::STREAM_UNAVAILABLE)
        );
    }
}
