//! Error types for the fetch service
//!
//! All errors use thiserror; request failures carry a typed kind so the
//! HTTP layer never has to infer meaning from message text.

use std::path::PathBuf;

use pakfetch_archive::ArchiveError;
use thiserror::Error;

/// Settings-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("Failed to read settings from {path}: {source}")]
    ReadFailed {
        /// Path to the settings file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Settings file was not valid JSON
    #[error("Invalid settings file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Required archive directory is missing or not a directory
    #[error("Archive directory does not exist: {0}")]
    MissingArchiveDirectory(PathBuf),

    /// Primary archive key was present but not well-formed hex
    #[error("Invalid primary archive key: {0}")]
    InvalidPrimaryKey(#[from] pakfetch_crypto::CryptoError),
}

/// Server startup and runtime errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Bootstrap failure against a required input
    #[error("Bootstrap failed: {0}")]
    Bootstrap(#[from] ArchiveError),

    /// Failed to bind the HTTP listener
    #[error("Failed to bind HTTP server to {addr}: {source}")]
    BindFailed {
        /// Address that failed to bind
        addr: std::net::SocketAddr,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Server shutdown error
    #[error("Server shutdown error: {0}")]
    Shutdown(String),
}

/// Per-request resolution errors
///
/// These are caught at the service boundary and turned into the
/// structured `{errored, note}` failure shape.
#[derive(Debug, Error)]
pub enum RequestError {
    /// No archive entry exists for the requested package
    #[error("Unable to find package")]
    PackageNotFound(String),

    /// Media decode produced no data; the export's own serialization is
    /// attached for diagnostics
    #[error("{note}")]
    Decode {
        /// Human-readable failure note
        note: String,
        /// JSON serialization of the offending export
        json_output: serde_json::Value,
    },

    /// Any other archive-layer failure
    #[error("{0}")]
    Archive(ArchiveError),

    /// Export serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RequestError {
    /// Classify an archive failure for a given request path
    pub fn from_archive(path: &str, error: ArchiveError) -> Self {
        if error.is_not_found() {
            Self::PackageNotFound(path.to_string())
        } else {
            Self::Archive(error)
        }
    }

    /// The note reported in the structured failure shape
    pub fn note(&self) -> String {
        match self {
            Self::PackageNotFound(_) => "Unable to find package".to_string(),
            Self::Decode { note, .. } => note.clone(),
            Self::Archive(e) => e.to_string(),
            Self::Serialization(e) => e.to_string(),
        }
    }
}
