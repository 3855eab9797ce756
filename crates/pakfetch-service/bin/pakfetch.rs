//! pakfetch server binary entry point
//!
//! Thin wrapper around the pakfetch-service library:
//! 1. Parses command-line arguments
//! 2. Loads the settings file
//! 3. Initializes logging
//! 4. Runs the blocking bootstrap and serves requests
//!
//! For library usage, see the pakfetch-service crate documentation.

use anyhow::Result;
use pakfetch_service::{Server, ServerConfig, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_args();
    let settings = Settings::from_file(&config.settings)?;

    // bHideConsole is presentation-only: it lowers the default console
    // verbosity, never the behavior
    let default_filter = if settings.hide_console { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("pakfetch starting...");
    tracing::info!(
        "Configuration loaded: bind={}, settings={:?}, sync label={:?}",
        config.http_bind,
        config.settings,
        config.sync_label
    );

    let server = Server::initialize(config, settings).await?;
    tracing::info!("Initialized provider successfully");

    server.run().await?;

    Ok(())
}
