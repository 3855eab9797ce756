//! Content-build synchronization for pakfetch
//!
//! Keeps the local virtual file index current against a remote
//! content-distribution service: authenticates with a client-credential
//! token exchange, resolves a release label to a build manifest, and
//! patches newly introduced chunked files into the index without
//! displacing anything the local archive set already provides.
//!
//! Synchronization is optional and one-shot: any failure here is meant
//! to be logged and skipped by the caller, never to abort startup.
//!
//! # Example
//!
//! ```no_run
//! use pakfetch_sync::{ManifestClient, SyncOptions, synchronize};
//!
//! # async fn run(index: &pakfetch_archive::ArchiveIndex) -> Result<(), pakfetch_sync::SyncError> {
//! let options = SyncOptions::new("Exports/.chunks".into());
//! let client = ManifestClient::new(options)?;
//!
//! match synchronize(index, &client, "Live").await {
//!     Ok(added) => println!("{added} entries patched"),
//!     Err(e) => eprintln!("synchronization skipped: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod auth;
pub mod builds;
pub mod chunks;
pub mod client;
pub mod error;
pub mod manifest;
pub mod patcher;

pub use auth::{AuthClient, AuthToken};
pub use builds::ContentBuildDescriptor;
pub use chunks::{ChunkProvider, ChunkedFile};
pub use client::{ManifestClient, SyncOptions, synchronize};
pub use error::{Result, SyncError};
pub use manifest::{ChunkPart, Manifest, ManifestFileEntry};
pub use patcher::patch_index;
