//! Error types for synchronization operations

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur during content-build synchronization
///
/// Synchronization is an optional startup step; callers treat any of
/// these as "skip synchronization for this run" rather than fatal.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected HTTP status from the remote service
    #[error("HTTP status {status} from {context}")]
    Status {
        /// Returned status code
        status: StatusCode,
        /// What was being requested
        context: String,
    },

    /// Token exchange did not produce a usable token
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// Payload could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A URL could not be constructed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Manifest content was structurally invalid
    #[error("Invalid manifest: {0}")]
    Manifest(String),

    /// Chunk cache I/O failure
    #[error("Chunk cache I/O on {path}: {source}")]
    CacheIo {
        /// File or directory the operation touched
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for synchronization operations
pub type Result<T> = std::result::Result<T, SyncError>;
