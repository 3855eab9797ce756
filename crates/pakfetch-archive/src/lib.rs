//! Container archive format and virtual file index
//!
//! This crate provides the local half of the pakfetch core: parsing the
//! fixed container archive scheme, building a keyed virtual file index
//! over a directory of archives, loading packages and their export
//! objects, and merging editor-only sidecar data back into primary
//! exports at resolution time.
//!
//! # Components
//!
//! - [`pak`]: container footer/index codec, archive handle, and builder
//! - [`ArchiveIndex`]: case-insensitive logical path → locator mapping
//!   with lazy entry decryption and remote-backed gap filling
//! - [`package`]: package/export object model and JSON serialization
//! - [`merge`]: the editor-data sidecar merge
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pakfetch_archive::{ArchiveIndex, merge::merge_exports};
//! use pakfetch_crypto::KeyStore;
//!
//! # async fn run() -> Result<(), pakfetch_archive::ArchiveError> {
//! let keys = Arc::new(KeyStore::new());
//! let index = ArchiveIndex::build("Paks".as_ref(), "UE5_3", keys)?;
//! let exports = merge_exports(&index, "Game/Content/Foo.uasset").await?;
//! println!("{} exports", exports.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod codec;
pub mod error;
pub mod index;
pub mod merge;
pub mod pak;
pub mod package;

pub use error::{ArchiveError, Result};
pub use index::{ArchiveIndex, RemoteFileSource};
pub use package::{ExportObject, MediaPayload, Package, PropertyValue};
