//! A cloneable handle for poking the session from external code.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio_util::sync::CancellationToken;

use crate::conversation::Conversation;

/// A cloneable handle for poking the session from external code.
///
/// All fields are `Arc`-wrapped, so cloning is cheap.
#[derive(Clone)]
pub struct SessionHandle {
    pub(crate) conversation: Arc<Mutex<Conversation>>,
    pub(crate) cancel: Arc<Mutex<CancellationToken>>,
    pub(crate) current_turn: Arc<AtomicU64>,
    pub(crate) idle_notify: Arc<tokio::sync::Notify>,
}

impl SessionHandle {
    pub(crate) fn new() -> Self {
        Self {
            conversation: Arc::new(Mutex::new(Conversation::default())),
            cancel: Arc::new(Mutex::new(CancellationToken::new())),
            current_turn: Arc::new(AtomicU64::new(0)),
            idle_notify: Arc::new(tokio::sync::Notify::new()),
        }
    }

    /// Abort the in-flight turn, if any.
    ///
    /// Messages it already appended stay in the log.
    pub fn cancel(&self) {
        self.cancel.lock().cancel();
    }

    /// Whether a turn is waiting on the agent.
    pub fn is_loading(&self) -> bool {
        self.conversation.lock().is_loading
    }

    /// Number of the most recently started turn (0 before the first send).
    pub fn current_turn(&self) -> u64 {
        self.current_turn.load(Ordering::Acquire)
    }

    /// Wait until no turn is loading.
    pub async fn wait_for_idle(&self) {
        let notified = self.idle_notify.notified();
        if !self.is_loading() {
            return;
        }
        notified.await;
    }

    /// Wait until no turn is loading, with a timeout.
    /// Returns `true` if idle was reached, `false` on timeout.
    pub async fn wait_for_idle_timeout(&self, timeout: std::time::Duration) -> bool {
        if !self.is_loading() {
            return true;
        }
        tokio::time::timeout(timeout, self.wait_for_idle())
            .await
            .is_ok()
    }

    /// Swap in a fresh token for a new turn, cancelling the previous one.
    pub(crate) fn replace_token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut slot = self.cancel.lock();
        slot.cancel();
        *slot = token.clone();
        token
    }
}
