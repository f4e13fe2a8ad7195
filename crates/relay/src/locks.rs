use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per channel, serialising history mutations in that channel.
///
/// Waiters queue in FIFO order. Locks nobody holds or waits on are pruned on
/// the next acquisition.
#[derive(Debug, Default)]
pub struct ChannelLocks {
    locks: Mutex<HashMap<u64, Arc<AsyncMutex<()>>>>,
}

impl ChannelLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, channel_id: u64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|id, lock| *id == channel_id || Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(channel_id).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of channels with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
