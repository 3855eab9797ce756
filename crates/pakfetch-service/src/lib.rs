//! Local fetch service for game-archive assets
//!
//! Exposes assets packed in encrypted container archives as individually
//! retrievable JSON or binary objects over a local HTTP interface, and
//! keeps the local archive set current against a remote
//! content-distribution service.
//!
//! # Architecture
//!
//! - `settings`: the flat key/value settings namespace the service
//!   consumes
//! - `state`: blocking bootstrap (keys, index, optional one-shot sync)
//!   and shared application state
//! - `service`: the [`RequestService`] façade — the only component the
//!   HTTP layer touches
//! - `http`: the export endpoint and failure-shape mapping
//! - `server`: configuration and orchestration
//!
//! # Example
//!
//! ```no_run
//! use pakfetch_service::{Server, ServerConfig, Settings};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     tracing_subscriber::fmt::init();
//!
//!     let config = ServerConfig::from_args();
//!     let settings = Settings::from_file(&config.settings)?;
//!
//!     let server = Server::initialize(config, settings).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod error;
pub mod http;
pub mod server;
pub mod service;
pub mod settings;
pub mod state;

pub use error::{ConfigError, RequestError, ServerError};
pub use server::{Server, ServerConfig};
pub use service::{RequestService, Resolved};
pub use settings::Settings;
pub use state::AppState;
