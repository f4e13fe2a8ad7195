//! Two-phase history update around one streaming call.

use tracing::debug;

use crate::history::ConversationStore;

/// Lifecycle of one user → model exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// User turn appended, answer not yet known.
    Pending,
    /// Model turn appended after the user turn.
    Committed,
    /// User turn removed again.
    RolledBack,
}

/// Guard over a dangling user turn.
///
/// Ends in exactly one of [`commit`](Self::commit) or
/// [`rollback`](Self::rollback). Dropping a pending exchange, e.g. when the
/// handling future is cancelled or panics, rolls it back.
#[must_use = "a pending exchange rolls back when dropped"]
pub struct PendingExchange<'a> {
    store: &'a ConversationStore,
    channel_id: u64,
    state: ExchangeState,
}

impl<'a> PendingExchange<'a> {
    /// Record the user's prompt and open the exchange.
    pub fn begin(store: &'a ConversationStore, channel_id: u64, prompt: &str) -> Self {
        store.append_user(channel_id, prompt);
        Self {
            store,
            channel_id,
            state: ExchangeState::Pending,
        }
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn commit(mut self, text: &str) -> ExchangeState {
        self.store.commit_model(self.channel_id, text);
        self.state = ExchangeState::Committed;
        debug!(channel_id = self.channel_id, "exchange committed");
        self.state
    }

    pub fn rollback(mut self) -> ExchangeState {
        self.undo();
        self.state
    }

    fn undo(&mut self) {
        self.store.rollback_last_user(self.channel_id);
        self.state = ExchangeState::RolledBack;
        debug!(channel_id = self.channel_id, "exchange rolled back");
    }
}

impl Drop for PendingExchange<'_> {
    fn drop(&mut self) {
        if self.state == ExchangeState::Pending {
            self.undo();
        }
    }
}
