//! Connector error kinds.
//!
//! Startup errors are fatal: they abort the connection attempt and release
//! any partially acquired resources. None are retried by this layer.
//!
//! Losing the authoritative player entity after a successful connect is not
//! represented here; it is surfaced as a [`crate::event::SessionEvent`] so
//! the owning layer chooses the response.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectError {
    /// Unrecognized or contradictory startup configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No developer credential could be resolved.
    #[error("missing developer credential: {0}")]
    MissingCredential(String),

    /// No login token matched the targeted session.
    #[error("no login token for session '{0}'")]
    SessionNotFound(String),

    /// The connection driver reported a failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Spawn requested with a name that is empty after trimming.
    #[error("player name must be non-empty")]
    InvalidPlayerName,

    /// Operation requires an established session.
    #[error("not connected")]
    NotConnected,
}
