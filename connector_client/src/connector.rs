//! Client connector state machine.
//!
//! One connector drives one session: a single async connect, per-frame
//! synchronous ticks while connected, and a two-phase teardown. All
//! blocking IO happens inside the driver's connect call; `tick()` never
//! blocks and is never re-entered, so no locking is needed around the
//! spawn state.
//!
//! State flow:
//! `Disconnected → Connecting → Connected → Disconnecting → Disconnected`.
//! World readiness and spawn pending live inside the per-session
//! [`SpawnRequestCoordinator`].

use tracing::{error, info, warn};

use connector_shared::cli::CommandLineInitializer;
use connector_shared::config::ConnectorConfig;
use connector_shared::credentials::{resolve_dev_auth_token, CredentialStore, Runtime};
use connector_shared::error::ConnectError;
use connector_shared::event::{SessionEvent, SessionEvents};
use connector_shared::intent::{new_worker_id, ConnectionIntent};
use connector_shared::player::SpawnResponder;
use connector_shared::sdk::{
    AuthMaterial, ConnectionDriver, ConnectionParams, EstablishedSession, SessionNotification,
};

use crate::spawn::SpawnRequestCoordinator;

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorState {
    /// No session; a connect may be started.
    Disconnected,
    /// Connect call in flight.
    Connecting,
    /// Session established; ticking.
    Connected,
    /// Teardown signalled; waiting for the driver to finish.
    Disconnecting,
}

/// Owns one client session against the hosted service.
pub struct ClientConnector {
    config: ConnectorConfig,
    state: ConnectorState,
    session: Option<EstablishedSession>,
    spawn: Option<SpawnRequestCoordinator>,
    events: SessionEvents,
}

impl ClientConnector {
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            config,
            state: ConnectorState::Disconnected,
            session: None,
            spawn: None,
            events: SessionEvents::new(),
        }
    }

    pub fn state(&self) -> ConnectorState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectorState::Connected
    }

    /// Worker id of the established session, if any.
    pub fn worker_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.worker_id.as_str())
    }

    /// Establishes the session described by `intent`.
    ///
    /// Resolves the worker id and credential material the intent needs,
    /// then hands everything to the driver in one asynchronous call. On
    /// failure every partially acquired resource is released and the
    /// connector returns to `Disconnected`.
    pub async fn connect(
        &mut self,
        driver: &mut dyn ConnectionDriver,
        intent: ConnectionIntent,
        runtime: Runtime,
        store: &dyn CredentialStore,
        cli: &CommandLineInitializer,
    ) -> Result<(), ConnectError> {
        if self.state != ConnectorState::Disconnected {
            return Err(ConnectError::Configuration(
                "connect called while a session is active".to_string(),
            ));
        }

        let worker_id = intent
            .needs_local_worker_id()
            .then(|| new_worker_id(&self.config.worker_type));

        let auth = if intent.needs_auth_token() {
            AuthMaterial::DevToken(resolve_dev_auth_token(runtime, store, cli)?)
        } else {
            AuthMaterial::None
        };

        info!(mode = ?intent.mode, external = intent.use_external_network, "Connecting");
        self.state = ConnectorState::Connecting;

        match driver
            .connect(ConnectionParams {
                intent,
                worker_id,
                auth,
            })
            .await
        {
            Ok(session) => {
                info!(worker_id = %session.worker_id, "Connection established");
                self.session = Some(session);
                self.spawn = Some(SpawnRequestCoordinator::new(self.config.max_spawn_retries));
                self.state = ConnectorState::Connected;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Connection failed");
                self.state = ConnectorState::Disconnected;
                Err(e)
            }
        }
    }

    /// Forwarded to the spawn coordinator; idempotent, no-op without a
    /// session.
    pub fn on_world_loaded(&mut self) {
        if let Some(spawn) = self.spawn.as_mut() {
            spawn.on_world_loaded();
        }
    }

    /// Queues a spawn request on the active session.
    pub fn request_spawn(
        &mut self,
        player_name: &str,
        responder: SpawnResponder,
    ) -> Result<(), ConnectError> {
        if self.state != ConnectorState::Connected {
            return Err(ConnectError::NotConnected);
        }
        self.spawn
            .as_mut()
            .ok_or(ConnectError::NotConnected)?
            .request_spawn(player_name, responder)
    }

    /// Runs one frame step: surfaces driver notifications, fires a due
    /// spawn request, and completes an in-progress teardown. Never blocks.
    pub fn tick(&mut self) {
        match self.state {
            ConnectorState::Connected => {
                if let (Some(session), Some(spawn)) =
                    (self.session.as_mut(), self.spawn.as_mut())
                {
                    for notification in session.control.drain_notifications() {
                        match notification {
                            SessionNotification::AuthoritativePlayerRemoved { entity_id } => {
                                error!(
                                    entity_id = entity_id.0,
                                    "Player entity removed while still connected"
                                );
                                self.events.push(SessionEvent::PlayerEntityLost);
                            }
                        }
                    }
                    spawn.tick(session.entities.as_mut());
                }
            }
            ConnectorState::Disconnecting => {
                let done = self
                    .session
                    .as_ref()
                    .map_or(true, |s| s.control.shutdown_complete());
                if done {
                    self.release_session("disconnect requested");
                }
            }
            ConnectorState::Disconnected | ConnectorState::Connecting => {}
        }
    }

    /// First phase of teardown: abandons pending spawn work (its responder
    /// is never invoked) and signals the driver. Completion is observed by
    /// `tick()`. Idempotent; safe to call in any state.
    pub fn begin_disconnect(&mut self) {
        match self.state {
            ConnectorState::Connected => {
                info!("Disconnecting");
                if let Some(spawn) = self.spawn.as_mut() {
                    spawn.abandon();
                }
                if let Some(session) = self.session.as_mut() {
                    session.control.begin_shutdown();
                }
                self.state = ConnectorState::Disconnecting;
            }
            ConnectorState::Disconnecting | ConnectorState::Disconnected => {}
            ConnectorState::Connecting => {
                // connect() is awaited to completion on this task, so a
                // teardown request cannot observe this state.
                warn!("begin_disconnect during connect; ignored");
            }
        }
    }

    /// Second phase of teardown: drops the session (releasing everything it
    /// owns) and reports the disconnect to the owner.
    fn release_session(&mut self, reason: &str) {
        self.session = None;
        self.spawn = None;
        self.state = ConnectorState::Disconnected;
        self.events.push(SessionEvent::Disconnected {
            reason: reason.to_string(),
        });
        info!(reason = %reason, "Session released");
    }

    /// Takes all session events queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }
}
