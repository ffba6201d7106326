//! `connector_client`
//!
//! Client-side connection bootstrap:
//! - One-shot connection establishment through an external driver
//! - Deferred, idempotent player-spawn coordination
//! - Two-phase session teardown
//! - Loopback driver simulating the hosted service

pub mod connector;
pub mod loopback;
pub mod spawn;

pub use connector::{ClientConnector, ConnectorState};
pub use spawn::SpawnRequestCoordinator;
