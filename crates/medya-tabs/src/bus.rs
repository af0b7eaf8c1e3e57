//! Broadcast bus for backend-state snapshots.

use tokio::sync::broadcast;

use crate::types::BackendState;

/// Fan-out of [`BackendState`] snapshots to every subscriber. Snapshots
/// are idempotent values; redelivery is harmless, and a slow subscriber
/// that lags only misses intermediate states, never the latest.
pub struct StateBus {
    sender: broadcast::Sender<BackendState>,
}

impl StateBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BackendState> {
        self.sender.subscribe()
    }

    /// Publish a snapshot, returning how many subscribers saw it.
    pub fn publish(&self, state: BackendState) -> usize {
        self.sender.send(state).unwrap_or(0)
    }
}
