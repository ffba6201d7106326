//! Configuration system.
//!
//! Loads connector configuration from JSON strings/files (file IO left to
//! app). The spawn retry budget is threaded explicitly through the
//! connector rather than living in mutable global state.

use serde::{Deserialize, Serialize};

/// Root configuration for the client connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Worker type registered with the hosted service.
    #[serde(default = "default_worker_type")]
    pub worker_type: String,
    /// Player name (demo binary default).
    #[serde(default = "default_player_name")]
    pub player_name: String,
    /// Retry budget forwarded with each player-creation request.
    /// The connector itself never retries.
    #[serde(default)]
    pub max_spawn_retries: u32,
    /// Simulation tick rate for the demo loop.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
}

fn default_worker_type() -> String {
    "GameClient".to_string()
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_tick_hz() -> u32 {
    60
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            worker_type: default_worker_type(),
            player_name: default_player_name(),
            max_spawn_retries: 0,
            tick_hz: default_tick_hz(),
        }
    }
}

impl ConnectorConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
