//! Connection strategy selection.
//!
//! A [`ConnectionIntent`] is an immutable description of how the client
//! should reach the hosted service. [`select_strategy`] builds one from the
//! runtime flags; it is total and pure. Actually opening the connection is
//! the driver's job (see [`crate::sdk`]).
//!
//! Strategy priority, first match wins:
//! 1. A non-empty target session name forces a session-targeted connect.
//! 2. An editor runtime connects locally with a fresh worker id.
//! 3. Otherwise the command-line service preference decides between a
//!    direct receptionist connect and a name-service-mediated one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConnectError;

/// How the client reaches the hosted service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// Local development connect from inside the editor.
    EditorLocal,
    /// Standalone build; the connection service is chosen from the
    /// command line.
    StandaloneAutoDetect,
    /// Connect to one specific hosted session by name.
    SessionTargeted,
}

/// Which connection service a standalone build goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionService {
    /// Direct connect to a local receptionist address.
    Receptionist,
    /// Name-service-mediated connect.
    Locator,
    /// Name-service-mediated connect through the alpha locator.
    AlphaLocator,
}

impl ConnectionService {
    /// Whether this service requires the external network address.
    pub fn requires_external_network(&self) -> bool {
        matches!(
            self,
            ConnectionService::Locator | ConnectionService::AlphaLocator
        )
    }
}

impl fmt::Display for ConnectionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionService::Receptionist => "receptionist",
            ConnectionService::Locator => "locator",
            ConnectionService::AlphaLocator => "alpha-locator",
        };
        f.write_str(s)
    }
}

impl FromStr for ConnectionService {
    type Err = ConnectError;

    /// Parses a command-line service name. Unrecognized values are a fatal
    /// configuration error, never a silent default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receptionist" => Ok(ConnectionService::Receptionist),
            "locator" => Ok(ConnectionService::Locator),
            "alpha-locator" => Ok(ConnectionService::AlphaLocator),
            other => Err(ConnectError::Configuration(format!(
                "unknown connection service '{other}' \
                 (expected receptionist, locator, or alpha-locator)"
            ))),
        }
    }
}

/// Immutable description of how to connect.
///
/// Invariants:
/// - `target_session` is `Some` iff `mode` is [`ConnectionMode::SessionTargeted`].
/// - `service_preference` is `Some` iff `mode` is
///   [`ConnectionMode::StandaloneAutoDetect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionIntent {
    pub mode: ConnectionMode,
    /// Trimmed, non-empty session name for session-targeted connects.
    pub target_session: Option<String>,
    /// Service choice for standalone connects.
    pub service_preference: Option<ConnectionService>,
    /// Whether the driver should use the externally visible network address.
    pub use_external_network: bool,
}

impl ConnectionIntent {
    /// Whether this intent goes through a name-service-mediated login
    /// listing (and therefore needs a developer auth token).
    pub fn needs_auth_token(&self) -> bool {
        self.mode == ConnectionMode::SessionTargeted
            || self
                .service_preference
                .is_some_and(|s| s.requires_external_network())
    }

    /// Whether the driver should generate requests against a locally created
    /// worker id (no login round-trip involved).
    pub fn needs_local_worker_id(&self) -> bool {
        self.mode == ConnectionMode::EditorLocal
            || self.service_preference == Some(ConnectionService::Receptionist)
    }
}

/// Chooses the connection strategy for this run. Total; never fails.
///
/// `session_target` is trimmed first; whitespace-only input counts as
/// absent. When a target session is present the service preference is
/// ignored.
pub fn select_strategy(
    is_editor: bool,
    session_target: Option<&str>,
    service_preference: ConnectionService,
) -> ConnectionIntent {
    let target = session_target
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    if let Some(target) = target {
        return ConnectionIntent {
            mode: ConnectionMode::SessionTargeted,
            target_session: Some(target),
            service_preference: None,
            use_external_network: true,
        };
    }

    if is_editor {
        return ConnectionIntent {
            mode: ConnectionMode::EditorLocal,
            target_session: None,
            service_preference: None,
            use_external_network: false,
        };
    }

    ConnectionIntent {
        mode: ConnectionMode::StandaloneAutoDetect,
        target_session: None,
        service_preference: Some(service_preference),
        use_external_network: service_preference.requires_external_network(),
    }
}

/// Generates a fresh worker id for flows that register locally instead of
/// going through a login listing.
pub fn new_worker_id(worker_type: &str) -> String {
    format!("{}-{:016x}", worker_type, rand::random::<u64>())
}
