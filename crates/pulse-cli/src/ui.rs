//! Plain terminal rendering of a chat turn

use std::io::{self, IsTerminal, Write};

use pulse_agent::{ChatMessage, ChatSession, EventKind, SessionEvent, SessionHandle, TurnOutcome};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::watch;

/// Display options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Print thoughts instead of hiding them
    pub show_thoughts: bool,
}

/// Process-wide Ctrl-C routing.
///
/// While a turn is in flight Ctrl-C cancels it; at the idle prompt it exits.
pub struct Interrupts {
    active: watch::Sender<Option<SessionHandle>>,
}

impl Interrupts {
    /// Start listening for Ctrl-C. Call once, from inside the runtime.
    pub fn install() -> Self {
        let (active, watched) = watch::channel(None::<SessionHandle>);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                let in_flight = watched.borrow().clone();
                match in_flight {
                    Some(handle) => handle.cancel(),
                    None => {
                        eprintln!();
                        std::process::exit(130);
                    }
                }
            }
        });
        Self { active }
    }

    fn arm(&self, handle: SessionHandle) {
        self.active.send_replace(Some(handle));
    }

    fn disarm(&self) {
        self.active.send_replace(None);
    }
}

/// Truncate a string to `max` characters, appending "..." if truncated.
/// Operates on Unicode char boundaries, not bytes.
pub fn truncate_chars(s: &str, max: usize) -> String {
    let mut chars = s.chars();
    let truncated: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

/// Text to print for a message, or `None` if it is not shown
pub fn render_message(message: &ChatMessage, options: &RenderOptions) -> Option<String> {
    if message.is_user() {
        return None;
    }

    let Some(kind) = message.kind else {
        return Some(message.text.clone());
    };

    match kind {
        EventKind::Thought if !options.show_thoughts => None,
        EventKind::Thought | EventKind::Observation => {
            Some(format!("[{}] {}", kind.label(), message.text))
        }
        EventKind::Action => Some(format!("[{}]", message.text)),
        EventKind::ActionInput => {
            let body = message
                .text
                .lines()
                .map(|l| format!("  {}", l))
                .collect::<Vec<_>>()
                .join("\n");
            Some(format!("[{}]\n{}", kind.label(), body))
        }
        EventKind::Final => Some(message.text.clone()),
    }
}

/// Renders the message log of one session, remembering how far it got
struct Renderer<'a, F> {
    session: &'a ChatSession,
    options: &'a RenderOptions,
    rendered: usize,
    emit: F,
}

impl<F: FnMut(String)> Renderer<'_, F> {
    /// Render every message appended since the last call
    fn catch_up(&mut self) {
        let pending = self.session.messages_from(self.rendered);
        self.rendered += pending.len();
        for message in &pending {
            if let Some(text) = render_message(message, self.options) {
                (self.emit)(text);
            }
        }
    }

    fn on_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::MessageAppended { .. } => self.catch_up(),
            SessionEvent::ServerError { message, .. } => {
                tracing::debug!(error = %message, "server error event");
            }
            SessionEvent::LoadingChanged { loading: true } => {
                if io::stderr().is_terminal() {
                    eprintln!("...");
                }
            }
            SessionEvent::TurnEnd {
                outcome: TurnOutcome::Cancelled,
                ..
            } => {
                self.catch_up();
                (self.emit)("[cancelled]".to_string());
            }
            _ => {}
        }
    }

    fn on_lagged(&mut self, skipped: u64) {
        tracing::debug!(skipped, "renderer fell behind the session");
        self.catch_up();
    }
}

/// Send one turn and pass each rendered line to `emit` as it streams.
///
/// The send runs on its own task. Lines are read from the message log, so a
/// burst that overruns the event channel is still rendered in full.
pub async fn stream_turn<F>(
    session: &ChatSession,
    input: &str,
    options: &RenderOptions,
    emit: F,
) -> Option<TurnOutcome>
where
    F: FnMut(String),
{
    let mut receiver = session.subscribe();
    let mut renderer = Renderer {
        session,
        options,
        rendered: session.message_count(),
        emit,
    };

    let mut task = {
        let session = session.clone();
        let input = input.to_string();
        tokio::spawn(async move { session.send(&input).await })
    };

    let joined = loop {
        tokio::select! {
            joined = &mut task => break joined,
            event = receiver.recv() => match event {
                Ok(event) => renderer.on_event(&event),
                Err(RecvError::Lagged(skipped)) => renderer.on_lagged(skipped),
                Err(RecvError::Closed) => break (&mut task).await,
            },
        }
    };

    loop {
        match receiver.try_recv() {
            Ok(event) => renderer.on_event(&event),
            Err(TryRecvError::Lagged(skipped)) => renderer.on_lagged(skipped),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    renderer.catch_up();

    match joined {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(error = %e, "turn task failed");
            None
        }
    }
}

/// Send one turn and print it to stdout as it streams. Ctrl-C cancels the turn.
pub async fn run_turn(
    session: &ChatSession,
    input: &str,
    options: &RenderOptions,
    interrupts: &Interrupts,
) -> Option<TurnOutcome> {
    interrupts.arm(session.handle());
    let outcome = stream_turn(session, input, options, |line| {
        println!("{}", line);
        io::stdout().flush().ok();
    })
    .await;
    interrupts.disarm();
    outcome
}
