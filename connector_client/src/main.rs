//! Standalone connector demo.
//!
//! Usage:
//!   cargo run -p connector_client -- [--editor] [--session <name>]
//!       [--connection-service receptionist|locator|alpha-locator]
//!       [--dev-auth-token <token>] [--name <player>]
//!
//! Connects through the loopback driver (which simulates the hosted
//! service), then drives the per-frame tick loop.
//!
//! Console commands:
//!   spawn <name> - Request a player spawn (queued until the world loads)
//!   status       - Show connector status
//!   disconnect   - Begin session teardown
//!   quit         - Exit

use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::info;

use connector_client::connector::ClientConnector;
use connector_client::loopback::LoopbackDriver;
use connector_shared::cli::CommandLineInitializer;
use connector_shared::config::ConnectorConfig;
use connector_shared::credentials::{
    LoginTokenDetails, MemoryCredentialStore, Runtime, DEV_AUTH_TOKEN_RESOURCE,
};
use connector_shared::event::SessionEvent;
use connector_shared::intent::select_strategy;
use connector_shared::player::SpawnResponse;

/// Sessions the loopback service pretends to host.
fn demo_login_tokens() -> Vec<LoginTokenDetails> {
    ["demo-1", "demo-2"]
        .into_iter()
        .map(|name| LoginTokenDetails {
            session_name: name.to_string(),
            login_token: format!("tok-{name}"),
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = CommandLineInitializer::from_env();
    let service = cli.connection_service().context("connection service")?;
    let intent = select_strategy(cli.editor(), cli.session(), service);
    let runtime = if cli.editor() {
        Runtime::Editor
    } else {
        Runtime::Production
    };

    let cfg = ConnectorConfig::default();
    info!(mode = ?intent.mode, service = ?intent.service_preference, "Starting connector");

    // The demo bundles a generated token so editor runs work out of the box.
    let store = MemoryCredentialStore::new().with_bundled(DEV_AUTH_TOKEN_RESOURCE, "demo-token");
    let mut driver = LoopbackDriver::new().with_login_tokens(demo_login_tokens());
    let handle = driver.handle();

    let mut connector = ClientConnector::new(cfg.clone());
    connector
        .connect(&mut driver, intent, runtime, &store, &cli)
        .await
        .context("connect")?;
    info!(worker_id = ?connector.worker_id(), "Connected");

    // The loopback world has nothing to stream in; it is ready immediately.
    connector.on_world_loaded();

    // Set up console input channel.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        use std::io::{BufRead, Write};
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).is_err() {
                break;
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("Connected. Type 'spawn <name>' to spawn, 'quit' to exit.");
    println!();

    let tick_interval = Duration::from_secs_f32(1.0 / cfg.tick_hz as f32);

    loop {
        // Process console commands.
        while let Ok(line) = console_rx.try_recv() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                ["spawn", rest @ ..] => {
                    let name = if rest.is_empty() {
                        cfg.player_name.clone()
                    } else {
                        rest.join(" ")
                    };
                    let result = connector.request_spawn(
                        &name,
                        Box::new(|response: SpawnResponse| {
                            if response.is_success() {
                                println!("Spawned as entity {:?}", response.entity_id);
                            } else {
                                println!("Spawn failed: {}", response.message);
                            }
                        }),
                    );
                    if let Err(e) = result {
                        println!("Error: {e}");
                    }
                }
                ["status"] => {
                    println!("State: {:?}", connector.state());
                    println!("Worker: {:?}", connector.worker_id());
                    println!("Spawned so far: {:?}", handle.spawned_players());
                }
                ["disconnect"] => connector.begin_disconnect(),
                ["quit"] | ["exit"] => return Ok(()),
                _ => println!("Commands: spawn <name> | status | disconnect | quit"),
            }
        }

        connector.tick();

        for event in connector.drain_events() {
            match event {
                SessionEvent::PlayerEntityLost => {
                    println!("Lost the player entity; disconnecting.");
                    connector.begin_disconnect();
                }
                SessionEvent::Disconnected { reason } => {
                    println!("Disconnected: {reason}");
                    return Ok(());
                }
            }
        }

        tokio::time::sleep(tick_interval).await;
    }
}
