//! Full connect flows: strategy selection through session establishment
//! against the loopback driver.

use connector_client::connector::{ClientConnector, ConnectorState};
use connector_client::loopback::LoopbackDriver;
use connector_shared::cli::CommandLineInitializer;
use connector_shared::config::ConnectorConfig;
use connector_shared::credentials::{
    CredentialStore, LoginTokenDetails, MemoryCredentialStore, Runtime, DEV_AUTH_TOKEN_KEY,
};
use connector_shared::error::ConnectError;
use connector_shared::intent::{select_strategy, ConnectionMode, ConnectionService};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

fn tokens(sessions: &[&str]) -> Vec<LoginTokenDetails> {
    sessions
        .iter()
        .map(|name| LoginTokenDetails {
            session_name: name.to_string(),
            login_token: format!("tok-{name}"),
        })
        .collect()
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Editor run with no target session: local receptionist connect with a
/// locally generated worker id, no credential resolution.
#[tokio::test]
async fn editor_local_flow() -> anyhow::Result<()> {
    init_tracing();

    let cli = CommandLineInitializer::from_args(&args(&["--editor"]));
    let intent = select_strategy(cli.editor(), cli.session(), cli.connection_service()?);
    assert_eq!(intent.mode, ConnectionMode::EditorLocal);
    assert!(!intent.use_external_network);

    let mut driver = LoopbackDriver::new();
    let mut connector = ClientConnector::new(ConnectorConfig::default());
    connector
        .connect(
            &mut driver,
            intent,
            Runtime::Editor,
            &MemoryCredentialStore::new(),
            &cli,
        )
        .await?;

    assert!(connector.is_connected());
    assert!(connector.worker_id().unwrap().starts_with("GameClient-"));
    Ok(())
}

/// Standalone run, receptionist preference: local connect, worker id
/// generated locally, still no credential resolution.
#[tokio::test]
async fn standalone_receptionist_flow() -> anyhow::Result<()> {
    init_tracing();

    let cli = CommandLineInitializer::from_args(&args(&["--connection-service", "receptionist"]));
    let intent = select_strategy(false, None, cli.connection_service()?);
    assert_eq!(intent.mode, ConnectionMode::StandaloneAutoDetect);
    assert!(!intent.use_external_network);

    let mut driver = LoopbackDriver::new();
    let mut connector = ClientConnector::new(ConnectorConfig::default());
    connector
        .connect(
            &mut driver,
            intent,
            Runtime::Production,
            &MemoryCredentialStore::new(),
            &cli,
        )
        .await?;

    assert!(connector.is_connected());
    Ok(())
}

/// Standalone locator run: credential comes from the command line, token
/// picked from the login listing, external network address in use.
#[tokio::test]
async fn standalone_locator_flow() -> anyhow::Result<()> {
    init_tracing();

    let cli = CommandLineInitializer::from_args(&args(&[
        "--connection-service",
        "locator",
        "--dev-auth-token",
        "cli-tok",
    ]));
    let intent = select_strategy(false, None, cli.connection_service()?);
    assert!(intent.use_external_network);

    let mut driver = LoopbackDriver::new().with_login_tokens(tokens(&["lobby-1"]));
    let mut connector = ClientConnector::new(ConnectorConfig::default());
    connector
        .connect(
            &mut driver,
            intent,
            Runtime::Production,
            &MemoryCredentialStore::new(),
            &cli,
        )
        .await?;

    assert!(connector.is_connected());
    assert_eq!(
        driver.handle().used_login_token(),
        Some("tok-lobby-1".to_string())
    );
    Ok(())
}

/// A locator preference that cannot authenticate must abort before any
/// driver attempt.
#[tokio::test]
async fn standalone_locator_without_token_fails_fast() {
    init_tracing();

    let cli = CommandLineInitializer::from_args(&args(&["--connection-service", "locator"]));
    let intent = select_strategy(false, None, cli.connection_service().unwrap());

    let mut driver = LoopbackDriver::new().with_login_tokens(tokens(&["lobby-1"]));
    let mut connector = ClientConnector::new(ConnectorConfig::default());
    let err = connector
        .connect(
            &mut driver,
            intent,
            Runtime::Production,
            &MemoryCredentialStore::new(),
            &cli,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ConnectError::MissingCredential(_)));
    assert_eq!(driver.handle().connect_attempts(), 0);
}

/// Session-targeted connect: the target wins over everything, the matching
/// token is selected, and the editor credential cache supplies the token.
#[tokio::test]
async fn session_targeted_flow() -> anyhow::Result<()> {
    init_tracing();

    let cli = CommandLineInitializer::from_args(&args(&[
        "--session",
        "arena-7",
        "--editor",
        "--connection-service",
        "locator",
    ]));
    let intent = select_strategy(cli.editor(), cli.session(), cli.connection_service()?);
    assert_eq!(intent.mode, ConnectionMode::SessionTargeted);
    assert!(intent.use_external_network);

    let mut store = MemoryCredentialStore::new();
    store.set(DEV_AUTH_TOKEN_KEY, "cached-tok");

    let mut driver =
        LoopbackDriver::new().with_login_tokens(tokens(&["arena-1", "arena-7", "arena-9"]));
    let mut connector = ClientConnector::new(ConnectorConfig::default());
    connector
        .connect(&mut driver, intent, Runtime::Editor, &store, &cli)
        .await?;

    assert!(connector.is_connected());
    assert_eq!(
        driver.handle().used_login_token(),
        Some("tok-arena-7".to_string())
    );
    Ok(())
}

/// Targeting a session absent from the listing is a hard error, not a
/// fallback to some other session.
#[tokio::test]
async fn session_targeted_no_match_is_fatal() {
    init_tracing();

    let cli = CommandLineInitializer::from_args(&[]);
    let intent = select_strategy(false, Some("arena-7"), ConnectionService::Receptionist);

    let mut store = MemoryCredentialStore::new();
    store.set(DEV_AUTH_TOKEN_KEY, "cached-tok");

    let mut driver = LoopbackDriver::new().with_login_tokens(tokens(&["arena-1"]));
    let mut connector = ClientConnector::new(ConnectorConfig::default());
    let err = connector
        .connect(&mut driver, intent, Runtime::Editor, &store, &cli)
        .await
        .unwrap_err();

    match err {
        ConnectError::SessionNotFound(name) => assert_eq!(name, "arena-7"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(connector.state(), ConnectorState::Disconnected);
    assert!(driver.handle().used_login_token().is_none());
}

/// Driver-reported failure tears down cleanly and leaves the connector
/// reusable for another attempt.
#[tokio::test]
async fn connect_failure_then_retry_by_owner() -> anyhow::Result<()> {
    init_tracing();

    let cli = CommandLineInitializer::from_args(&[]);
    let mut connector = ClientConnector::new(ConnectorConfig::default());

    let mut failing = LoopbackDriver::new().fail_connect("maintenance window");
    let intent = select_strategy(true, None, ConnectionService::Receptionist);
    let err = connector
        .connect(
            &mut failing,
            intent.clone(),
            Runtime::Editor,
            &MemoryCredentialStore::new(),
            &cli,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectError::ConnectionFailed(_)));
    assert_eq!(connector.state(), ConnectorState::Disconnected);

    // The owning layer decides to retry with a healthy driver.
    let mut healthy = LoopbackDriver::new();
    connector
        .connect(
            &mut healthy,
            intent,
            Runtime::Editor,
            &MemoryCredentialStore::new(),
            &cli,
        )
        .await?;
    assert!(connector.is_connected());
    Ok(())
}
