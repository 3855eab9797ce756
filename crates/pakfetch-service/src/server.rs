//! Server configuration and orchestration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::error::ServerError;
use crate::settings::Settings;
use crate::state::AppState;

/// Server configuration loaded from CLI args and environment variables
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pakfetch",
    about = "Local fetch service exposing game-archive assets as JSON or binary objects",
    version
)]
pub struct ServerConfig {
    /// HTTP bind address
    #[arg(long, env = "PAKFETCH_HTTP_BIND", default_value = "127.0.0.1:1500")]
    pub http_bind: SocketAddr,

    /// Path to the settings JSON file
    #[arg(long, env = "PAKFETCH_SETTINGS", default_value = "./pakfetch.json")]
    pub settings: PathBuf,

    /// Release-channel label to synchronize against once at startup
    ///
    /// When unset, no remote synchronization runs.
    #[arg(long, env = "PAKFETCH_SYNC_LABEL")]
    pub sync_label: Option<String>,
}

impl ServerConfig {
    /// Parse configuration from command-line arguments
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }
}

/// Server orchestration: bootstrap once, then serve requests
pub struct Server {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl Server {
    /// Run the blocking bootstrap and prepare the server
    ///
    /// # Errors
    ///
    /// Returns `ServerError` when a required input fails: unreadable
    /// settings, a malformed primary key, or an unreadable archive
    /// directory. Optional steps (remote sync, individual dynamic keys)
    /// are recovered internally.
    pub async fn initialize(config: ServerConfig, settings: Settings) -> Result<Self, ServerError> {
        let state = AppState::initialize(settings, config.sync_label.as_deref()).await?;

        tracing::info!(
            "Provider initialized with {} indexed entries",
            state.index().len()
        );

        Ok(Self {
            state: Arc::new(state),
            config,
        })
    }

    /// Shared application state
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Serve requests until interrupted
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the listener fails to bind.
    pub async fn run(self) -> Result<(), ServerError> {
        crate::http::start_server(self.config.http_bind, self.state).await
    }
}
