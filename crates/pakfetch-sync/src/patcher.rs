//! Index patching
//!
//! Merges manifest file entries into the virtual file index. A remote
//! entry is added only when no local entry already provides the path:
//! existing local data always wins, and the patch only fills gaps.

use std::sync::Arc;

use pakfetch_archive::ArchiveIndex;
use tracing::info;

use crate::chunks::{ChunkProvider, ChunkedFile};
use crate::manifest::Manifest;

/// Patch manifest entries into the index, returning the number added
///
/// Applying the same manifest twice adds nothing the second time.
pub fn patch_index(index: &ArchiveIndex, manifest: &Manifest, provider: &Arc<ChunkProvider>) -> usize {
    let mut added = 0usize;

    for file in &manifest.files {
        if index.contains(&file.filename) {
            continue;
        }

        let source = Arc::new(ChunkedFile::new(file.clone(), Arc::clone(provider)));
        if index.insert_remote(&file.filename, source) {
            added += 1;
        }
    }

    info!(
        "Patched {added} of {} manifest entries into the index",
        manifest.files.len()
    );

    added
}
