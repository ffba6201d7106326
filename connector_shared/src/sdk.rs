//! Collaborator interfaces.
//!
//! Everything the connector needs from the hosted service is behind these
//! traits: the one-shot connection establishment, the entity-creation
//! system, and session control. Implementations live outside this core;
//! `connector_client` ships a loopback simulation for tests and the demo
//! binary.

use async_trait::async_trait;

use crate::error::ConnectError;
use crate::intent::ConnectionIntent;
use crate::player::{CreatePlayerRequest, PlayerEntityId, SpawnResponder};

/// Credential material resolved ahead of the connect call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMaterial {
    /// Receptionist-style flows register directly; no token involved.
    None,
    /// Developer auth token for login-listing flows.
    DevToken(String),
}

/// Fully resolved parameters handed to the driver.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub intent: ConnectionIntent,
    /// Locally generated worker id for flows that register directly.
    pub worker_id: Option<String>,
    pub auth: AuthMaterial,
}

/// Out-of-band notifications from an established session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotification {
    /// The service removed the player's authoritative entity while the
    /// session was still up.
    AuthoritativePlayerRemoved { entity_id: PlayerEntityId },
}

/// The entity-creation system of an established session.
pub trait EntityCreator: Send {
    /// Issues a player-creation request. The response arrives through the
    /// responder; the call itself never blocks.
    fn request_player_creation(&mut self, request: CreatePlayerRequest, responder: SpawnResponder);
}

/// Teardown and notification surface of an established session.
pub trait SessionControl: Send {
    /// Starts tearing the session down. Idempotent.
    fn begin_shutdown(&mut self);

    /// Whether teardown has finished. Polled from the frame tick.
    fn shutdown_complete(&self) -> bool;

    /// Takes any notifications that arrived since the last poll.
    fn drain_notifications(&mut self) -> Vec<SessionNotification>;
}

/// A live session produced by a successful connect.
///
/// Dropping this releases every resource the session owns, so failure paths
/// only need to let it go out of scope.
pub struct EstablishedSession {
    /// Worker id the service knows this client as.
    pub worker_id: String,
    pub entities: Box<dyn EntityCreator>,
    pub control: Box<dyn SessionControl>,
}

/// The external connection SDK.
///
/// Connection establishment is a single asynchronous operation: it either
/// yields an [`EstablishedSession`] or fails with the driver's error
/// message. There are no intermediate states visible to the caller.
#[async_trait]
pub trait ConnectionDriver: Send {
    async fn connect(&mut self, params: ConnectionParams)
        -> Result<EstablishedSession, ConnectError>;
}
