//! Editor-data merge
//!
//! A primary package may have a sidecar package holding editor-only data,
//! named by inserting `.o` before the final extension (`Foo.uasset` →
//! `Foo.o.uasset`). Resolution merges matching sidecar exports back into
//! the primary objects and surfaces sidecar-only exports after them.
//!
//! Output order is a contract: all primary exports first (each possibly
//! augmented), then unconsumed sidecar exports, both in their original
//! package order.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::index::ArchiveIndex;
use crate::package::ExportObject;

/// Suffix distinguishing a primary export's editor-data counterpart
pub const EDITOR_ONLY_SUFFIX: &str = "EditorOnlyData";

/// Derive the sidecar package path for a logical path
///
/// Inserts `.o` before the final extension; a path without an extension
/// gets a bare `.o` suffix.
pub fn sidecar_path(path: &str) -> String {
    match path.rfind('.') {
        Some(dot) => format!("{}.o{}", &path[..dot], &path[dot..]),
        None => format!("{path}.o"),
    }
}

/// Load the exports behind `path` and merge its sidecar package, if any
///
/// Failure to load the primary package is the caller's failure; any
/// failure around the sidecar package is treated as the sidecar being
/// absent.
pub async fn merge_exports(index: &ArchiveIndex, path: &str) -> Result<Vec<ExportObject>> {
    let mut exports = index.load_all_objects(path).await?;

    let sidecar = sidecar_path(path);
    let Some(editor_package) = index.try_load_package(&sidecar).await else {
        return Ok(exports);
    };

    debug!(
        "Merging {} editor exports from {sidecar}",
        editor_package.exports.len()
    );

    // Consumption is tracked per sidecar export position: two exports
    // with equal names are still distinct objects.
    let mut consumed: HashSet<usize> = HashSet::new();

    for export in &mut exports {
        let editor_name = format!("{}{EDITOR_ONLY_SUFFIX}", export.name);
        let matched = editor_package
            .exports
            .iter()
            .enumerate()
            .find(|(_, editor)| editor.name == editor_name);

        if let Some((position, editor)) = matched {
            export.append_properties(&editor.properties);
            consumed.insert(position);
        }
    }

    for (position, editor) in editor_package.exports.into_iter().enumerate() {
        if !consumed.contains(&position) {
            exports.push(editor);
        }
    }

    Ok(exports)
}
