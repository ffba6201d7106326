//! Session events.
//!
//! The connector never calls back into its owner. Anything the owning layer
//! must react to is queued here and drained once per frame, so there are no
//! implicit multicast subscriptions to leak or fire during teardown.

/// Events the owning layer decides how to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The authoritative player entity was removed while the session was
    /// still connected. The connector does not re-spawn on its own; the
    /// owner chooses whether to disconnect or request a new spawn.
    PlayerEntityLost,
    /// The session finished tearing down.
    Disconnected { reason: String },
}

/// Drain-style event queue.
#[derive(Debug, Default)]
pub struct SessionEvents {
    queue: Vec<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event for the owner.
    pub fn push(&mut self, event: SessionEvent) {
        self.queue.push(event);
    }

    /// Takes all queued events, oldest first.
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
