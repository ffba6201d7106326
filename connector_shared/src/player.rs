//! Player-creation messages.
//!
//! Types exchanged with the external entity-creation system. The wire
//! format of the payload is owned by that system; this side only promises
//! UTF-8 bytes of the trimmed player name.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Identifies the player's entity on the hosted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerEntityId(pub u64);

/// A player-creation request handed to the entity-creation system.
#[derive(Debug, Clone)]
pub struct CreatePlayerRequest {
    /// Encoded player name (see [`encode_player_name`]).
    pub serialized_player_name: Bytes,
    /// How many times the entity-creation system may retry on transient
    /// failure. Zero means fail straight back to the responder.
    pub retry_budget: u32,
}

/// Outcome class of a player-creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnResponseCode {
    Success,
    Failed,
}

/// Response delivered to the spawn responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnResponse {
    pub code: SpawnResponseCode,
    /// Present on success.
    pub entity_id: Option<PlayerEntityId>,
    pub message: String,
}

impl SpawnResponse {
    pub fn success(entity_id: PlayerEntityId) -> Self {
        Self {
            code: SpawnResponseCode::Success,
            entity_id: Some(entity_id),
            message: String::new(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            code: SpawnResponseCode::Failed,
            entity_id: None,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == SpawnResponseCode::Success
    }
}

/// Continuation invoked with the spawn outcome. Dropped uninvoked when the
/// request is superseded or the session tears down.
pub type SpawnResponder = Box<dyn FnOnce(SpawnResponse) + Send>;

/// Encodes a player name into the payload the entity-creation system
/// expects.
pub fn encode_player_name(name: &str) -> Bytes {
    Bytes::from(name.trim().as_bytes().to_vec())
}
