//! Session-change event bus backed by a `tokio::sync::broadcast`
//! channel.
//!
//! [`SessionBus`] republishes provider notifications to any number of
//! local subscribers after the [`SessionStore`](crate::store::SessionStore)
//! has applied them to its state.

use agentdesk_client::provider::AuthChange;
use agentdesk_core::types::Timestamp;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// A session change as republished to local listeners.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub change: AuthChange,
    /// When the change was applied locally (UTC).
    pub timestamp: Timestamp,
}

/// In-process fan-out bus for session changes.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published event, in publish order.
pub struct SessionBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are
    /// dropped and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently
    /// dropped.
    pub fn publish(&self, event: SessionEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Register a listener. Events published after this call are
    /// delivered in order.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
