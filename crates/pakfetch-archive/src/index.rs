//! Virtual file index
//!
//! Maps logical paths (case-insensitive) to the physical location of
//! their bytes: an entry inside a local container archive, or a
//! remote-backed source patched in after a manifest sync. Built once at
//! startup; safe for concurrent reads afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use pakfetch_crypto::KeyStore;
use tracing::{debug, info, warn};

use crate::error::{ArchiveError, Result};
use crate::package::{ExportObject, Package};
use crate::pak::PakArchive;

/// Byte source for entries that are not present in any local archive
///
/// Implemented by the synchronization layer on top of chunked remote
/// files; this crate only needs the bytes.
#[async_trait]
pub trait RemoteFileSource: Send + Sync {
    /// Produce the file's complete plain bytes
    async fn read(&self) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Physical location of one virtual file
#[derive(Clone)]
enum FileLocator {
    /// Entry inside a local container archive
    Local {
        archive: Arc<PakArchive>,
        entry_index: usize,
    },
    /// Remote-backed chunked file
    Remote { source: Arc<dyn RemoteFileSource> },
}

/// One entry of the virtual file index
struct VirtualFileEntry {
    /// Logical path with original casing
    path: String,
    locator: FileLocator,
}

/// The keyed virtual file index over a set of container archives
pub struct ArchiveIndex {
    directory: PathBuf,
    version_tag: String,
    keys: Arc<KeyStore>,
    entries: DashMap<String, VirtualFileEntry>,
}

impl ArchiveIndex {
    /// Build the index by scanning container files directly under
    /// `directory` (non-recursive)
    ///
    /// Scan order is alphabetical by file name; the first archive
    /// providing a path wins. Unreadable or corrupt archives are logged
    /// and skipped — only an unreadable directory fails the build.
    /// Decryption keys are not needed here: entries of encrypted archives
    /// stay indexed and become readable once their key is submitted.
    pub fn build(directory: &Path, version_tag: &str, keys: Arc<KeyStore>) -> Result<Self> {
        let index = Self {
            directory: directory.to_path_buf(),
            version_tag: version_tag.to_string(),
            keys,
            entries: DashMap::new(),
        };

        let reader = std::fs::read_dir(directory).map_err(|source| ArchiveError::Io {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut containers: Vec<PathBuf> = reader
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("pak"))
            })
            .collect();
        containers.sort();

        let mut archive_count = 0usize;
        for container in &containers {
            let archive = match PakArchive::open(container) {
                Ok(archive) => Arc::new(archive),
                Err(e) => {
                    warn!("Skipping unreadable container {}: {e}", container.display());
                    continue;
                }
            };

            for (entry_index, entry) in archive.entries().iter().enumerate() {
                let key = Self::normalize(&entry.path);
                if let Entry::Vacant(vacant) = index.entries.entry(key) {
                    vacant.insert(VirtualFileEntry {
                        path: entry.path.clone(),
                        locator: FileLocator::Local {
                            archive: Arc::clone(&archive),
                            entry_index,
                        },
                    });
                }
            }

            archive_count += 1;
        }

        info!(
            "Indexed {} entries from {} archives in {} (version tag {})",
            index.entries.len(),
            archive_count,
            directory.display(),
            index.version_tag
        );

        Ok(index)
    }

    /// Directory the index was built from
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Version tag the index was built with
    pub fn version_tag(&self) -> &str {
        &self.version_tag
    }

    /// Key store consulted for lazy entry decryption
    pub fn keys(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry exists for the path (case-insensitive)
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&Self::normalize(path))
    }

    /// Insert a remote-backed entry unless the path is already provided
    ///
    /// Returns whether the entry was inserted. Existing local data always
    /// wins; remote synchronization only fills gaps.
    pub fn insert_remote(&self, path: &str, source: Arc<dyn RemoteFileSource>) -> bool {
        match self.entries.entry(Self::normalize(path)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(VirtualFileEntry {
                    path: path.to_string(),
                    locator: FileLocator::Remote { source },
                });
                true
            }
        }
    }

    /// Read the plain bytes behind a logical path
    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let (entry_path, locator) = {
            let entry = self
                .entries
                .get(&Self::normalize(path))
                .ok_or_else(|| ArchiveError::EntryNotFound(path.to_string()))?;
            (entry.path.clone(), entry.locator.clone())
        };

        match locator {
            FileLocator::Local {
                archive,
                entry_index,
            } => archive.read_entry(&archive.entries()[entry_index], &self.keys),
            FileLocator::Remote { source } => {
                source
                    .read()
                    .await
                    .map_err(|e| ArchiveError::RemoteSource {
                        path: entry_path,
                        reason: e.to_string(),
                    })
            }
        }
    }

    /// Load and parse the package behind a logical path
    pub async fn load_package(&self, path: &str) -> Result<Package> {
        let bytes = self.read(path).await?;
        Package::parse(&bytes).map_err(|e| ArchiveError::InvalidPackage {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load every export of the package behind a logical path, in
    /// package order
    pub async fn load_all_objects(&self, path: &str) -> Result<Vec<ExportObject>> {
        Ok(self.load_package(path).await?.exports)
    }

    /// Non-throwing package load for optional lookups
    ///
    /// Absence — or any failure to open or parse the package — yields
    /// `None`; sidecar lookups treat both identically.
    pub async fn try_load_package(&self, path: &str) -> Option<Package> {
        match self.load_package(path).await {
            Ok(package) => Some(package),
            Err(e) => {
                debug!("Optional package {path} unavailable: {e}");
                None
            }
        }
    }

    /// Normalize a logical path into its index key
    fn normalize(path: &str) -> String {
        path.replace('\\', "/")
            .trim_start_matches('/')
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pak::PakBuilder;
    use crate::package::{Package, PropertyValue};
    use pretty_assertions::assert_eq;

    fn package_bytes(exports: Vec<ExportObject>) -> Vec<u8> {
        Package::from(exports).build().expect("build package")
    }

    fn data_export(name: &str, value: i64) -> ExportObject {
        let mut export = ExportObject::new(name, "DataAsset");
        export.properties.push(("Value".to_string(), PropertyValue::Int(value)));
        export
    }

    struct StaticSource(Vec<u8>);

    #[async_trait]
    impl RemoteFileSource for StaticSource {
        async fn read(
            &self,
        ) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_build_and_case_insensitive_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        PakBuilder::new()
            .add_file(
                "Game/Content/Foo.uasset",
                package_bytes(vec![data_export("A", 1)]),
            )
            .write_to(&dir.path().join("content.pak"))
            .expect("write container");

        let index = ArchiveIndex::build(dir.path(), "UE5_3", Arc::new(KeyStore::new()))
            .expect("build index");
        assert_eq!(index.len(), 1);
        assert!(index.contains("game/content/FOO.uasset"));

        let exports = index
            .load_all_objects("GAME/CONTENT/foo.UASSET")
            .await
            .expect("load objects");
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].name, "A");
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let index = ArchiveIndex::build(dir.path(), "UE5_3", Arc::new(KeyStore::new()))
            .expect("build index");

        let result = index.read("Game/Missing.uasset").await;
        assert!(matches!(result, Err(ArchiveError::EntryNotFound(_))));
        assert!(index.try_load_package("Game/Missing.uasset").await.is_none());
    }

    #[tokio::test]
    async fn test_scan_order_first_archive_wins() {
        let dir = tempfile::tempdir().expect("tempdir");

        PakBuilder::new()
            .add_file("Game/Shared.uasset", b"from-a".to_vec())
            .write_to(&dir.path().join("a.pak"))
            .expect("write container");
        PakBuilder::new()
            .add_file("Game/Shared.uasset", b"from-b".to_vec())
            .write_to(&dir.path().join("b.pak"))
            .expect("write container");

        let index = ArchiveIndex::build(dir.path(), "UE5_3", Arc::new(KeyStore::new()))
            .expect("build index");
        let data = index.read("Game/Shared.uasset").await.expect("read entry");
        assert_eq!(data, b"from-a");
    }

    #[tokio::test]
    async fn test_corrupt_archive_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("bad.pak"), b"garbage").expect("write file");
        PakBuilder::new()
            .add_file("Game/Good.uasset", b"ok".to_vec())
            .write_to(&dir.path().join("good.pak"))
            .expect("write container");

        let index = ArchiveIndex::build(dir.path(), "UE5_3", Arc::new(KeyStore::new()))
            .expect("build index");
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_remote_fills_gaps_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        PakBuilder::new()
            .add_file("Game/Local.uasset", b"local".to_vec())
            .write_to(&dir.path().join("content.pak"))
            .expect("write container");

        let index = ArchiveIndex::build(dir.path(), "UE5_3", Arc::new(KeyStore::new()))
            .expect("build index");

        // Existing local entry wins over the remote source
        let inserted =
            index.insert_remote("GAME/local.uasset", Arc::new(StaticSource(b"remote".to_vec())));
        assert!(!inserted);
        assert_eq!(index.read("Game/Local.uasset").await.expect("read"), b"local");

        // New paths are filled from the remote source
        let inserted =
            index.insert_remote("Game/New.uasset", Arc::new(StaticSource(b"remote".to_vec())));
        assert!(inserted);
        assert_eq!(index.read("game/new.uasset").await.expect("read"), b"remote");
    }

    #[tokio::test]
    async fn test_encrypted_entry_readable_after_key_submission() {
        let dir = tempfile::tempdir().expect("tempdir");
        let guid: pakfetch_crypto::KeyGuid = "00000000-0000-0000-0000-000000000001"
            .parse()
            .expect("valid guid");
        let material = vec![7u8; 32];

        PakBuilder::new()
            .encryption_key(guid, material.clone())
            .add_encrypted_file("Game/Secret.uasset", b"classified".to_vec())
            .write_to(&dir.path().join("secret.pak"))
            .expect("write container");

        let keys = Arc::new(KeyStore::new());
        let index = ArchiveIndex::build(dir.path(), "UE5_3", Arc::clone(&keys))
            .expect("build index");

        // Indexed but unresolvable until the key arrives
        assert!(index.contains("Game/Secret.uasset"));
        assert!(matches!(
            index.read("Game/Secret.uasset").await,
            Err(ArchiveError::KeyNotFound(_))
        ));

        keys.submit(guid, material);
        assert_eq!(
            index.read("Game/Secret.uasset").await.expect("read"),
            b"classified"
        );
    }
}
