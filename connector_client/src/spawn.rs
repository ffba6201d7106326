//! Deferred player-spawn coordination.
//!
//! The coordinator tracks two flags per session: whether the world has
//! finished loading and whether a spawn was requested. Each frame tick
//! fires at most one player-creation request once both hold, then returns
//! to accepting state, so spawning is repeatable within one session.
//!
//! At most one request is pending at a time. A second request before the
//! first fires replaces it (last write wins); the superseded responder is
//! dropped without being invoked.

use tracing::{debug, info};

use connector_shared::error::ConnectError;
use connector_shared::player::{encode_player_name, CreatePlayerRequest, SpawnResponder};
use connector_shared::sdk::EntityCreator;

struct PendingSpawn {
    player_name: String,
    responder: SpawnResponder,
}

/// Per-session spawn state. Created on connection establishment, dropped on
/// disconnect; mutated only by the methods below.
pub struct SpawnRequestCoordinator {
    world_ready: bool,
    pending: Option<PendingSpawn>,
    retry_budget: u32,
}

impl SpawnRequestCoordinator {
    /// `retry_budget` is forwarded with each request; the coordinator
    /// itself never retries.
    pub fn new(retry_budget: u32) -> Self {
        Self {
            world_ready: false,
            pending: None,
            retry_budget,
        }
    }

    /// Marks the world as loaded. Idempotent; the flag is never reset
    /// within a session.
    pub fn on_world_loaded(&mut self) {
        if !self.world_ready {
            info!("World loaded, spawn requests can now fire");
            self.world_ready = true;
        }
    }

    pub fn world_ready(&self) -> bool {
        self.world_ready
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queues a spawn request. May be called before the world is ready; the
    /// request fires on the first tick after both conditions hold.
    pub fn request_spawn(
        &mut self,
        player_name: &str,
        responder: SpawnResponder,
    ) -> Result<(), ConnectError> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(ConnectError::InvalidPlayerName);
        }

        if self.pending.is_some() {
            debug!(player = %player_name, "Replacing pending spawn request");
        }
        self.pending = Some(PendingSpawn {
            player_name: player_name.to_string(),
            responder,
        });
        Ok(())
    }

    /// Runs one frame step. Fires the pending request iff the world is
    /// ready; no-op otherwise. Never blocks. Returns whether a request was
    /// issued.
    pub fn tick(&mut self, entities: &mut dyn EntityCreator) -> bool {
        if !self.world_ready {
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };

        info!(player = %pending.player_name, "Issuing player-creation request");
        let request = CreatePlayerRequest {
            serialized_player_name: encode_player_name(&pending.player_name),
            retry_budget: self.retry_budget,
        };
        entities.request_player_creation(request, pending.responder);
        true
    }

    /// Drops any pending request without invoking its responder. Used on
    /// teardown so nothing completes after the session is gone.
    pub fn abandon(&mut self) {
        if self.pending.take().is_some() {
            debug!("Abandoning pending spawn request");
        }
    }
}
