//! Per-channel conversation memory.
//!
//! Every exchange with the backend is framed as append-user, then exactly one
//! of commit-model or rollback. A user turn left dangling after a failed or
//! empty exchange would skew every later request in the channel, so nothing
//! outside this module mutates a history directly.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use tracing::{debug, warn};

use crate::fragment::{Role, Turn};

/// Ordered user/model turns keyed by channel id.
#[derive(Debug, Default)]
pub struct ConversationStore {
    channels: Mutex<HashMap<u64, Vec<Turn>>>,
    max_turns: Option<usize>,
}

impl ConversationStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that keeps at most `max_turns` turns per channel, dropping the
    /// oldest user/model pairs on commit.
    pub fn with_max_turns(max_turns: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            max_turns: Some(max_turns.max(2)),
        }
    }

    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    // Never held across `.await`; a poisoned map is still structurally valid.
    fn lock(&self) -> MutexGuard<'_, HashMap<u64, Vec<Turn>>> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current history of `channel_id`, empty if it has none.
    pub fn get(&self, channel_id: u64) -> Vec<Turn> {
        self.lock().get(&channel_id).cloned().unwrap_or_default()
    }

    pub fn len(&self, channel_id: u64) -> usize {
        self.lock().get(&channel_id).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, channel_id: u64) -> bool {
        self.len(channel_id) == 0
    }

    /// Append a user turn, creating the channel's history if needed.
    pub fn append_user(&self, channel_id: u64, text: impl Into<String>) {
        self.lock()
            .entry(channel_id)
            .or_default()
            .push(Turn::user(text));
    }

    /// Append the model's answer to the trailing user turn.
    ///
    /// Calling this without a trailing user turn is a logic error.
    pub fn commit_model(&self, channel_id: u64, text: impl Into<String>) {
        let mut channels = self.lock();
        let turns = channels.entry(channel_id).or_default();
        debug_assert!(
            turns.last().is_some_and(|t| t.role == Role::User),
            "commit_model without a dangling user turn"
        );
        turns.push(Turn::model(text));

        if let Some(max) = self.max_turns {
            let excess = turns.len().saturating_sub(max);
            // Whole pairs only, so the history keeps starting with a user turn.
            let drop = excess + excess % 2;
            if drop > 0 {
                turns.drain(..drop.min(turns.len()));
                debug!(channel_id, dropped = drop, "trimmed channel history");
            }
        }
    }

    /// Remove the trailing user turn and return it.
    ///
    /// Does nothing if the history is empty or already ends with a model turn.
    pub fn rollback_last_user(&self, channel_id: u64) -> Option<Turn> {
        let mut channels = self.lock();
        let turns = channels.get_mut(&channel_id)?;
        if turns.last().is_none_or(|t| t.role != Role::User) {
            warn!(channel_id, "rollback requested without a dangling user turn");
            return None;
        }
        let turn = turns.pop();
        if turns.is_empty() {
            channels.remove(&channel_id);
        }
        turn
    }

    /// Forget everything said in `channel_id`. Returns whether there was
    /// anything to forget.
    pub fn clear(&self, channel_id: u64) -> bool {
        self.lock().remove(&channel_id).is_some()
    }
}
