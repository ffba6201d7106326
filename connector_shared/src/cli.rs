//! Command-line surface.
//!
//! The initializer owns two startup concerns: the connection service
//! preference for standalone builds, and the developer auth token for
//! production builds. Arguments are scanned by hand, `--flag value` style.

use crate::error::ConnectError;
use crate::intent::ConnectionService;

/// Parsed command-line arguments relevant to connection setup.
#[derive(Debug, Clone, Default)]
pub struct CommandLineInitializer {
    connection_service: Option<String>,
    dev_auth_token: Option<String>,
    session: Option<String>,
    player_name: Option<String>,
    editor: bool,
}

impl CommandLineInitializer {
    /// Scans an argument list. Unknown flags are ignored here; values are
    /// validated at the point of use.
    pub fn from_args(args: &[String]) -> Self {
        let mut init = Self::default();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--connection-service" if i + 1 < args.len() => {
                    init.connection_service = Some(args[i + 1].clone());
                    i += 2;
                }
                "--dev-auth-token" if i + 1 < args.len() => {
                    init.dev_auth_token = Some(args[i + 1].clone());
                    i += 2;
                }
                "--session" if i + 1 < args.len() => {
                    init.session = Some(args[i + 1].clone());
                    i += 2;
                }
                "--name" if i + 1 < args.len() => {
                    init.player_name = Some(args[i + 1].clone());
                    i += 2;
                }
                "--editor" => {
                    init.editor = true;
                    i += 1;
                }
                _ => i += 1,
            }
        }
        init
    }

    /// Reads the initializer from the process arguments.
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_args(&args)
    }

    /// The connection service preference for a standalone run.
    ///
    /// Absent defaults to [`ConnectionService::Receptionist`]; an
    /// unrecognized value is a fatal configuration error.
    pub fn connection_service(&self) -> Result<ConnectionService, ConnectError> {
        match &self.connection_service {
            Some(raw) => raw.parse(),
            None => Ok(ConnectionService::Receptionist),
        }
    }

    /// Developer auth token supplied on the command line, if any.
    /// Production builds resolve their credential exclusively through this.
    pub fn dev_auth_token(&self) -> Option<&str> {
        self.dev_auth_token.as_deref()
    }

    /// Target session name, if any.
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Player name override for the demo binary.
    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// Whether this run pretends to be an editor runtime.
    pub fn editor(&self) -> bool {
        self.editor
    }
}
