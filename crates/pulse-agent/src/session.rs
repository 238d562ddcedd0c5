//! Chat session: orchestrates one user turn at a time against the agent stream

use std::sync::{Arc, atomic::Ordering};

use futures::StreamExt;
use pulse_sse::{AgentRequest, ByteStream, SseEvent};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::{
    conversation::Conversation,
    error::{Error, Result},
    events::{SessionEvent, TurnOutcome},
    handle::SessionHandle,
    interpreter::{Interpretation, interpret},
    message::ChatMessage,
    transport::Transport,
};

/// Text of the agent message appended when a turn cannot start streaming
pub const STREAM_UNAVAILABLE: &str = "Unable to start stream.";

/// A chat with the streaming agent.
///
/// Cloning is cheap and every clone shares the same conversation.
#[derive(Clone)]
pub struct ChatSession {
    transport: Arc<dyn Transport>,
    event_tx: broadcast::Sender<SessionEvent>,
    handle: SessionHandle,
}

impl ChatSession {
    /// Create a new session
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            transport,
            event_tx,
            handle: SessionHandle::new(),
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Get a cloneable handle for cancellation and status
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Copy of the current conversation state
    pub fn snapshot(&self) -> Conversation {
        self.handle.conversation.lock().clone()
    }

    /// Number of messages in the log
    pub fn message_count(&self) -> usize {
        self.handle.conversation.lock().messages.len()
    }

    /// Messages from position `start` of the log onwards
    pub fn messages_from(&self, start: usize) -> Vec<ChatMessage> {
        let conv = self.handle.conversation.lock();
        conv.messages
            .get(start..)
            .map(<[ChatMessage]>::to_vec)
            .unwrap_or_default()
    }

    /// Current transcript text
    pub fn transcript(&self) -> String {
        self.handle.conversation.lock().transcript.snapshot()
    }

    /// Whether a turn is waiting on the agent
    pub fn is_loading(&self) -> bool {
        self.handle.is_loading()
    }

    /// Abort the in-flight turn, if any
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Send one user turn and stream the agent's reply into the conversation.
    ///
    /// Returns `None` without touching state when the input is blank. A new
    /// send cancels any turn still in flight.
    pub async fn send(&self, input: &str) -> Option<TurnOutcome> {
        if input.trim().is_empty() {
            return None;
        }

        let (turn, chat_history, cancel) = self.begin_turn(input);

        let outcome = self.run_turn(turn, input, chat_history, &cancel).await;
        self.end_turn(turn, outcome);
        Some(outcome)
    }

    /// Append the user message and take the transcript snapshot for the request.
    ///
    /// The turn number and its cancellation token are assigned under the
    /// conversation lock, so the latest turn always owns the live token.
    fn begin_turn(&self, input: &str) -> (u64, String, CancellationToken) {
        let message = ChatMessage::user(input);

        let (turn, chat_history, cancel) = {
            let mut conv = self.handle.conversation.lock();
            let turn = self.handle.current_turn.fetch_add(1, Ordering::AcqRel) + 1;
            let cancel = self.handle.replace_token();
            conv.messages.push(message.clone());
            conv.transcript.push_user(input);
            conv.is_loading = true;
            (turn, conv.transcript.snapshot(), cancel)
        };

        tracing::debug!(turn, "turn started");
        let _ = self.event_tx.send(SessionEvent::TurnStart {
            turn,
            input: input.to_string(),
        });
        let _ = self.event_tx.send(SessionEvent::MessageAppended { turn, message });
        let _ = self.event_tx.send(SessionEvent::LoadingChanged { loading: true });

        (turn, chat_history, cancel)
    }

    async fn run_turn(
        &self,
        turn: u64,
        input: &str,
        chat_history: String,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        let request = AgentRequest::new(input, chat_history);

        let bytes = match self.open_stream(request, cancel).await {
            Ok(bytes) => bytes,
            Err(Error::Cancelled) => return TurnOutcome::Cancelled,
            Err(Error::Sse(e)) => {
                if e.is_unauthorized() {
                    tracing::warn!(turn, "agent rejected the bearer token");
                }
                tracing::warn!(turn, error = %e, "failed to start agent stream");
                self.append(turn, ChatMessage::fallback(STREAM_UNAVAILABLE), None);
                return TurnOutcome::Failed;
            }
        };

        let mut events = pulse_sse::events(bytes);
        let mut completed = false;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(turn, "turn cancelled mid-stream");
                    return TurnOutcome::Cancelled;
                }
                next = events.next() => next,
            };

            match next {
                Some(Ok(event)) => {
                    if self.apply(turn, &event) {
                        completed = true;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(turn, error = %e, "agent stream ended abnormally");
                    break;
                }
                None => break,
            }
        }

        if completed {
            TurnOutcome::Completed
        } else {
            TurnOutcome::Ended
        }
    }

    async fn open_stream(
        &self,
        request: AgentRequest,
        cancel: &CancellationToken,
    ) -> Result<ByteStream> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.transport.open(request) => result,
        }
    }

    /// Apply one event to the conversation. Returns `true` for `done`.
    fn apply(&self, turn: u64, event: &SseEvent) -> bool {
        tracing::debug!(turn, event = %event.event, len = event.data.len(), "event received");

        match interpret(event) {
            Interpretation::Append {
                message,
                transcript_line,
            } => {
                self.append(turn, message, Some(&transcript_line));
                false
            }
            Interpretation::Error(message) => {
                tracing::warn!(turn, error = %message, "agent reported an error");
                self.handle.conversation.lock().last_error = Some(message.clone());
                let _ = self
                    .event_tx
                    .send(SessionEvent::ServerError { turn, message });
                false
            }
            Interpretation::Done => {
                self.clear_loading(turn);
                true
            }
            Interpretation::Malformed { event, reason } => {
                tracing::warn!(
                    turn,
                    event = %event,
                    reason = %reason,
                    "dropping malformed payload"
                );
                false
            }
            Interpretation::Ignored { event } => {
                tracing::trace!(turn, event = %event, "ignoring event");
                false
            }
        }
    }

    fn append(&self, turn: u64, message: ChatMessage, transcript_line: Option<&str>) {
        {
            let mut conv = self.handle.conversation.lock();
            conv.messages.push(message.clone());
            if let Some(line) = transcript_line {
                conv.transcript.push_line(line);
            }
        }
        let _ = self
            .event_tx
            .send(SessionEvent::MessageAppended { turn, message });
    }

    /// Clear the loading flag if `turn` is still the latest turn
    fn clear_loading(&self, turn: u64) {
        let changed = {
            let mut conv = self.handle.conversation.lock();
            let latest = self.handle.current_turn.load(Ordering::Acquire) == turn;
            let changed = latest && conv.is_loading;
            if changed {
                conv.is_loading = false;
            }
            changed
        };

        if changed {
            let _ = self
                .event_tx
                .send(SessionEvent::LoadingChanged { loading: false });
            self.handle.idle_notify.notify_waiters();
        }
    }

    fn end_turn(&self, turn: u64, outcome: TurnOutcome) {
        self.clear_loading(turn);
        tracing::debug!(turn, ?outcome, "turn finished");
        let _ = self.event_tx.send(SessionEvent::TurnEnd { turn, outcome });
    }
}
