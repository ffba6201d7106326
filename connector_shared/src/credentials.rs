//! Credential resolution for name-service-mediated connects.
//!
//! Two concerns live here:
//! - Picking one login token out of the listing returned by the hosted
//!   service. Selection is a predicate value passed to
//!   [`select_login_token`], so callers compose policies instead of
//!   overriding a flow type.
//! - Resolving the developer auth token that the login listing itself
//!   requires. Editor runtimes read a locally cached token, falling back to
//!   a bundled resource; production runtimes delegate entirely to the
//!   command line so a shipped build can never pick up a developer
//!   credential from the local machine.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::CommandLineInitializer;
use crate::error::ConnectError;

/// Key under which the editor caches the developer auth token in the
/// persistent local store.
pub const DEV_AUTH_TOKEN_KEY: &str = "dev_auth_token";

/// Name of the bundled read-only resource holding a generated token.
pub const DEV_AUTH_TOKEN_RESOURCE: &str = "DevAuthToken";

/// One credential from the hosted service's login listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginTokenDetails {
    /// Name of the session this token grants access to.
    pub session_name: String,
    /// The opaque login token itself.
    pub login_token: String,
}

/// Which runtime the client is executing under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    /// Running inside the editor; developer credentials are available.
    Editor,
    /// Shipped build; credentials come from the command line only.
    Production,
}

/// Persistent local key-value store plus bundled resource lookup.
///
/// The editor uses this for developer token caching. Implementations own
/// the actual persistence; [`MemoryCredentialStore`] backs tests and the
/// demo binary.
pub trait CredentialStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    /// Reads a read-only resource bundled with the build, by name.
    fn load_bundled(&self, name: &str) -> Option<String>;
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: std::collections::HashMap<String, String>,
    bundled: std::collections::HashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bundled resource, as if packaged with the build.
    pub fn with_bundled(mut self, name: &str, contents: &str) -> Self {
        self.bundled.insert(name.to_string(), contents.to_string());
        self
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn load_bundled(&self, name: &str) -> Option<String> {
        self.bundled.get(name).cloned()
    }
}

/// Picks the first login token matching `matcher` from a listing.
///
/// No match is an error, never a silent fallback to some other session.
/// `target` only labels the error message.
pub fn select_login_token<'a>(
    tokens: &'a [LoginTokenDetails],
    target: &str,
    matcher: impl Fn(&LoginTokenDetails) -> bool,
) -> Result<&'a str, ConnectError> {
    tokens
        .iter()
        .find(|t| matcher(t))
        .map(|t| t.login_token.as_str())
        .ok_or_else(|| ConnectError::SessionNotFound(target.to_string()))
}

/// Selection predicate for session-targeted connects: exact session-name
/// match.
pub fn session_matcher(target: &str) -> impl Fn(&LoginTokenDetails) -> bool + '_ {
    move |token| token.session_name == target
}

/// Resolves the developer auth token for a login-listing connect.
pub fn resolve_dev_auth_token(
    runtime: Runtime,
    store: &dyn CredentialStore,
    cli: &CommandLineInitializer,
) -> Result<String, ConnectError> {
    match runtime {
        Runtime::Editor => {
            if let Some(token) = store.get(DEV_AUTH_TOKEN_KEY) {
                debug!("Using cached developer auth token");
                return Ok(token);
            }

            store.load_bundled(DEV_AUTH_TOKEN_RESOURCE).ok_or_else(|| {
                ConnectError::MissingCredential(format!(
                    "no cached token under '{DEV_AUTH_TOKEN_KEY}' and no bundled \
                     '{DEV_AUTH_TOKEN_RESOURCE}' resource; generate a developer \
                     auth token and cache or bundle it"
                ))
            })
        }
        Runtime::Production => cli.dev_auth_token().map(str::to_string).ok_or_else(|| {
            ConnectError::MissingCredential(
                "production builds take the developer auth token from \
                 --dev-auth-token"
                    .to_string(),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<LoginTokenDetails> {
        vec![
            LoginTokenDetails {
                session_name: "arena-1".to_string(),
                login_token: "tok-1".to_string(),
            },
            LoginTokenDetails {
                session_name: "arena-7".to_string(),
                login_token: "tok-7".to_string(),
            },
        ]
    }

    #[test]
    fn matching_token_is_selected() {
        let tokens = listing();
        let token = select_login_token(&tokens, "arena-7", session_matcher("arena-7")).unwrap();
        assert_eq!(token, "tok-7");
    }

    #[test]
    fn no_match_is_session_not_found() {
        let tokens = listing();
        let err =
            select_login_token(&tokens, "arena-9", session_matcher("arena-9")).unwrap_err();
        match err {
            ConnectError::SessionNotFound(name) => assert_eq!(name, "arena-9"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_listing_is_session_not_found() {
        let err = select_login_token(&[], "arena-7", session_matcher("arena-7")).unwrap_err();
        assert!(matches!(err, ConnectError::SessionNotFound(_)));
    }

    #[test]
    fn editor_prefers_cached_token() {
        let mut store =
            MemoryCredentialStore::new().with_bundled(DEV_AUTH_TOKEN_RESOURCE, "bundled-tok");
        store.set(DEV_AUTH_TOKEN_KEY, "cached-tok");

        let cli = CommandLineInitializer::from_args(&[]);
        let token = resolve_dev_auth_token(Runtime::Editor, &store, &cli).unwrap();
        assert_eq!(token, "cached-tok");
    }

    #[test]
    fn editor_falls_back_to_bundled_resource() {
        let store =
            MemoryCredentialStore::new().with_bundled(DEV_AUTH_TOKEN_RESOURCE, "bundled-tok");

        let cli = CommandLineInitializer::from_args(&[]);
        let token = resolve_dev_auth_token(Runtime::Editor, &store, &cli).unwrap();
        assert_eq!(token, "bundled-tok");
    }

    #[test]
    fn editor_without_any_token_fails_actionably() {
        let store = MemoryCredentialStore::new();
        let cli = CommandLineInitializer::from_args(&[]);

        let err = resolve_dev_auth_token(Runtime::Editor, &store, &cli).unwrap_err();
        match err {
            ConnectError::MissingCredential(msg) => {
                assert!(msg.contains(DEV_AUTH_TOKEN_RESOURCE));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn production_delegates_to_command_line() {
        // A cached token must never leak into a production resolve.
        let mut store = MemoryCredentialStore::new();
        store.set(DEV_AUTH_TOKEN_KEY, "cached-tok");

        let args = ["--dev-auth-token".to_string(), "cli-tok".to_string()];
        let cli = CommandLineInitializer::from_args(&args);

        let token = resolve_dev_auth_token(Runtime::Production, &store, &cli).unwrap();
        assert_eq!(token, "cli-tok");
    }

    #[test]
    fn production_without_cli_token_fails() {
        let mut store = MemoryCredentialStore::new();
        store.set(DEV_AUTH_TOKEN_KEY, "cached-tok");

        let cli = CommandLineInitializer::from_args(&[]);
        let err = resolve_dev_auth_token(Runtime::Production, &store, &cli).unwrap_err();
        assert!(matches!(err, ConnectError::MissingCredential(_)));
    }
}
