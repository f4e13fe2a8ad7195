use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

/// Channels where every message is treated as a query, mention or not.
#[derive(Debug, Default)]
pub struct ActivationRegistry {
    channels: Mutex<HashSet<u64>>,
}

impl ActivationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<u64>> {
        self.channels.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns `true` if the channel was not active before.
    pub fn activate(&self, channel_id: u64) -> bool {
        self.lock().insert(channel_id)
    }

    /// Returns `true` if the channel was active before.
    pub fn deactivate(&self, channel_id: u64) -> bool {
        self.lock().remove(&channel_id)
    }

    pub fn is_active(&self, channel_id: u64) -> bool {
        self.lock().contains(&channel_id)
    }
}
