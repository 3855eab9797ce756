//! Error types for archive and index operations

use std::path::PathBuf;

use pakfetch_crypto::{CryptoError, KeyGuid};
use thiserror::Error;

/// Errors that can occur while reading archives or resolving paths
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// No virtual file entry exists for the requested path
    ///
    /// This is the one error kind the request layer maps to its
    /// "Unable to find package" note; everything else surfaces its own
    /// description.
    #[error("No archive entry for path: {0}")]
    EntryNotFound(String),

    /// I/O failure against a container file or the archive directory
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory the operation touched
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Container footer or index could not be parsed
    #[error("Invalid container {path}: {reason}")]
    InvalidContainer {
        /// Container file
        path: PathBuf,
        /// Reason the container was rejected
        reason: String,
    },

    /// Package payload could not be parsed
    #[error("Invalid package {path}: {reason}")]
    InvalidPackage {
        /// Logical path of the package
        path: String,
        /// Reason the payload was rejected
        reason: String,
    },

    /// Entry is encrypted and no key is registered for its identifier
    #[error("No key registered for encryption GUID {0}")]
    KeyNotFound(KeyGuid),

    /// Decryption failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A remote-backed entry failed to produce its bytes
    #[error("Remote source failed for {path}: {reason}")]
    RemoteSource {
        /// Logical path of the entry
        path: String,
        /// Reason the source failed
        reason: String,
    },
}

impl ArchiveError {
    /// Whether this failure means the requested package does not exist
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::EntryNotFound(_))
    }
}

/// Result alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;
