//! Loopback connection driver.
//!
//! Simulates the hosted service in-process for the demo binary and the
//! integration tests. In production this would interface with the vendor
//! connection SDK; the loopback honors the same contract: one async
//! connect, immediate-completion player creation, polled shutdown, and
//! out-of-band notifications.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use connector_shared::credentials::{select_login_token, session_matcher, LoginTokenDetails};
use connector_shared::error::ConnectError;
use connector_shared::intent::ConnectionMode;
use connector_shared::player::{CreatePlayerRequest, PlayerEntityId, SpawnResponder, SpawnResponse};
use connector_shared::sdk::{
    AuthMaterial, ConnectionDriver, ConnectionParams, EntityCreator, EstablishedSession,
    SessionControl, SessionNotification,
};

#[derive(Default)]
struct LoopbackState {
    connect_attempts: u32,
    used_login_token: Option<String>,
    spawned_players: Vec<String>,
    fail_next_spawn: Option<String>,
    notifications: Vec<SessionNotification>,
    shutdown_requested: bool,
    next_entity_id: u64,
    next_worker_seq: u64,
}

/// Inspection and fault-injection handle shared with every session the
/// driver produces.
#[derive(Clone)]
pub struct LoopbackHandle {
    shared: Arc<Mutex<LoopbackState>>,
}

impl LoopbackHandle {
    fn state(&self) -> MutexGuard<'_, LoopbackState> {
        self.shared.lock().expect("loopback state poisoned")
    }

    pub fn connect_attempts(&self) -> u32 {
        self.state().connect_attempts
    }

    /// Login token the last connect authenticated with, if any.
    pub fn used_login_token(&self) -> Option<String> {
        self.state().used_login_token.clone()
    }

    /// Player names the entity-creation system has spawned, in order.
    pub fn spawned_players(&self) -> Vec<String> {
        self.state().spawned_players.clone()
    }

    /// Makes the next player-creation request fail with `reason`.
    pub fn fail_next_spawn(&self, reason: &str) {
        self.state().fail_next_spawn = Some(reason.to_string());
    }

    /// Emits an authoritative-player-removed notification, as the service
    /// does when it drops the player's entity mid-session.
    pub fn remove_authoritative_player(&self, entity_id: PlayerEntityId) {
        self.state()
            .notifications
            .push(SessionNotification::AuthoritativePlayerRemoved { entity_id });
    }

    pub fn shutdown_requested(&self) -> bool {
        self.state().shutdown_requested
    }
}

/// In-process stand-in for the hosted connection SDK.
pub struct LoopbackDriver {
    login_tokens: Vec<LoginTokenDetails>,
    fail_connect: Option<String>,
    shared: Arc<Mutex<LoopbackState>>,
}

impl LoopbackDriver {
    pub fn new() -> Self {
        Self {
            login_tokens: Vec::new(),
            fail_connect: None,
            shared: Arc::new(Mutex::new(LoopbackState::default())),
        }
    }

    /// Seeds the login listing served to locator-mediated connects.
    pub fn with_login_tokens(mut self, tokens: Vec<LoginTokenDetails>) -> Self {
        self.login_tokens = tokens;
        self
    }

    /// Makes every connect attempt fail with `reason`.
    pub fn fail_connect(mut self, reason: &str) -> Self {
        self.fail_connect = Some(reason.to_string());
        self
    }

    pub fn handle(&self) -> LoopbackHandle {
        LoopbackHandle {
            shared: self.shared.clone(),
        }
    }

    fn require_token<'a>(auth: &'a AuthMaterial) -> Result<&'a str, ConnectError> {
        match auth {
            AuthMaterial::DevToken(token) => Ok(token),
            AuthMaterial::None => Err(ConnectError::ConnectionFailed(
                "login listing requires a developer auth token".to_string(),
            )),
        }
    }
}

impl Default for LoopbackDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionDriver for LoopbackDriver {
    async fn connect(
        &mut self,
        params: ConnectionParams,
    ) -> Result<EstablishedSession, ConnectError> {
        let handle = self.handle();
        handle.state().connect_attempts += 1;

        if let Some(reason) = &self.fail_connect {
            return Err(ConnectError::ConnectionFailed(reason.clone()));
        }

        let worker_id = match params.intent.mode {
            ConnectionMode::SessionTargeted => {
                let _ = Self::require_token(&params.auth)?;
                let target = params
                    .intent
                    .target_session
                    .as_deref()
                    .unwrap_or_default();
                let token =
                    select_login_token(&self.login_tokens, target, session_matcher(target))?;
                handle.state().used_login_token = Some(token.to_string());
                let seq = {
                    let mut state = handle.state();
                    state.next_worker_seq += 1;
                    state.next_worker_seq
                };
                format!("hosted-worker-{seq}")
            }
            _ if params.intent.needs_auth_token() => {
                // Locator-mediated standalone connect: any session from the
                // listing will do.
                let _ = Self::require_token(&params.auth)?;
                let first = self.login_tokens.first().ok_or_else(|| {
                    ConnectError::ConnectionFailed("login listing is empty".to_string())
                })?;
                handle.state().used_login_token = Some(first.login_token.clone());
                let seq = {
                    let mut state = handle.state();
                    state.next_worker_seq += 1;
                    state.next_worker_seq
                };
                format!("hosted-worker-{seq}")
            }
            _ => params.worker_id.ok_or_else(|| {
                ConnectError::ConnectionFailed(
                    "receptionist-style connect needs a locally generated worker id".to_string(),
                )
            })?,
        };

        Ok(EstablishedSession {
            worker_id,
            entities: Box::new(LoopbackEntityCreator {
                shared: self.shared.clone(),
            }),
            control: Box::new(LoopbackControl {
                shared: self.shared.clone(),
            }),
        })
    }
}

struct LoopbackEntityCreator {
    shared: Arc<Mutex<LoopbackState>>,
}

impl EntityCreator for LoopbackEntityCreator {
    fn request_player_creation(&mut self, request: CreatePlayerRequest, responder: SpawnResponder) {
        let mut state = self.shared.lock().expect("loopback state poisoned");

        if let Some(reason) = state.fail_next_spawn.take() {
            drop(state);
            responder(SpawnResponse::failed(reason));
            return;
        }

        let name = String::from_utf8_lossy(&request.serialized_player_name).into_owned();
        state.next_entity_id += 1;
        let entity_id = PlayerEntityId(state.next_entity_id);
        state.spawned_players.push(name);
        drop(state);

        responder(SpawnResponse::success(entity_id));
    }
}

struct LoopbackControl {
    shared: Arc<Mutex<LoopbackState>>,
}

impl LoopbackControl {
    fn state(&self) -> MutexGuard<'_, LoopbackState> {
        self.shared.lock().expect("loopback state poisoned")
    }
}

impl SessionControl for LoopbackControl {
    fn begin_shutdown(&mut self) {
        self.state().shutdown_requested = true;
    }

    fn shutdown_complete(&self) -> bool {
        self.state().shutdown_requested
    }

    fn drain_notifications(&mut self) -> Vec<SessionNotification> {
        std::mem::take(&mut self.state().notifications)
    }
}
