//! Application state and bootstrap
//!
//! Bootstrap is a blocking initialization step: the key store is
//! populated, the archive index is built, and the optional one-shot
//! synchronization runs — all before the first request is accepted.
//! Failures against required inputs abort startup; optional steps are
//! logged and skipped.

use std::sync::Arc;

use pakfetch_archive::ArchiveIndex;
use pakfetch_crypto::{ArchiveKey, KeyGuid, KeyStore};
use pakfetch_sync::{ManifestClient, SyncOptions, synchronize};
use tracing::{info, warn};

use crate::error::{ConfigError, ServerError};
use crate::service::RequestService;
use crate::settings::Settings;

/// Shared application state behind the HTTP layer
pub struct AppState {
    settings: Settings,
    keys: Arc<KeyStore>,
    index: Arc<ArchiveIndex>,
    service: RequestService,
}

impl AppState {
    /// Run the blocking bootstrap: keys, index, optional synchronization
    pub async fn initialize(
        settings: Settings,
        sync_label: Option<&str>,
    ) -> Result<Self, ServerError> {
        info!("Initializing provider state");

        let keys = Arc::new(KeyStore::new());
        Self::populate_keys(&settings, &keys)?;

        if let Some(mappings) = &settings.mapping_file_path {
            if mappings.is_file() {
                info!("Mappings: {}", mappings.display());
            } else {
                warn!("Mapping file not found: {}", mappings.display());
            }
        }
        info!("Archive directory: {}", settings.archive_directory.display());
        info!("Engine versioning: {}", settings.unreal_version);

        let index = Arc::new(ArchiveIndex::build(
            &settings.archive_directory,
            &settings.unreal_version,
            Arc::clone(&keys),
        )?);

        if let Some(label) = sync_label {
            Self::run_synchronization(&settings, &index, label).await;
        }

        let service = RequestService::new(Arc::clone(&index));

        Ok(Self {
            settings,
            keys,
            index,
            service,
        })
    }

    /// Submit the primary key (when configured) and each dynamic key
    ///
    /// A malformed primary key is a configuration error; a malformed
    /// dynamic key entry skips only itself.
    fn populate_keys(settings: &Settings, keys: &KeyStore) -> Result<(), ConfigError> {
        if !settings.archive_key.is_empty() {
            let key = ArchiveKey::from_hex(KeyGuid::ZERO, &settings.archive_key)?;
            info!("Submitted primary archive key");
            keys.submit_key(key);
        }

        if !settings.dynamic_keys.is_empty() {
            info!("Reading {} dynamic keys", settings.dynamic_keys.len());
        }

        for entry in &settings.dynamic_keys {
            match ArchiveKey::parse_dynamic(entry) {
                Ok(key) => {
                    info!("Submitted dynamic key for {}", key.guid);
                    keys.submit_key(key);
                }
                Err(e) => warn!("Skipping dynamic key: {e}"),
            }
        }

        Ok(())
    }

    /// One-shot index synchronization; failures are logged and skipped
    async fn run_synchronization(settings: &Settings, index: &Arc<ArchiveIndex>, label: &str) {
        let options = SyncOptions::new(settings.chunk_cache_dir());

        let client = match ManifestClient::new(options) {
            Ok(client) => client,
            Err(e) => {
                warn!("Synchronization unavailable: {e}");
                return;
            }
        };

        match synchronize(index, &client, label).await {
            Ok(added) => info!("Synchronization added {added} entries for label '{label}'"),
            Err(e) => warn!("Synchronization skipped: {e}"),
        }
    }

    /// Settings the state was built from
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The key store, for post-startup key submission
    pub fn keys(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    /// The virtual file index
    pub fn index(&self) -> &Arc<ArchiveIndex> {
        &self.index
    }

    /// The request façade
    pub fn service(&self) -> &RequestService {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pakfetch_archive::pak::PakBuilder;
    use pakfetch_archive::{ExportObject, Package};
    use pretty_assertions::assert_eq;

    fn settings_for(dir: &std::path::Path) -> Settings {
        serde_json::from_str(&format!(r#"{{"ArchiveDirectory": {dir:?}}}"#))
            .expect("valid settings")
    }

    #[tokio::test]
    async fn test_initialize_builds_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        PakBuilder::new()
            .add_file(
                "Game/Foo.uasset",
                Package::from(vec![ExportObject::new("A", "DataAsset")])
                    .build()
                    .expect("build"),
            )
            .write_to(&dir.path().join("content.pak"))
            .expect("write container");

        let state = AppState::initialize(settings_for(dir.path()), None)
            .await
            .expect("initialize");
        assert_eq!(state.index().len(), 1);
        assert!(state.keys().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_submits_keys_best_effort() {
        let dir = tempfile::tempdir().expect("tempdir");

        let mut settings = settings_for(dir.path());
        settings.archive_key = "0x11223344".to_string();
        settings.dynamic_keys = vec![
            r#"(Key="1A2B",Guid="00000000-0000-0000-0000-000000000001")"#.to_string(),
            "malformed entry".to_string(),
            r#"(Key="CCDD",Guid="00000000-0000-0000-0000-000000000002")"#.to_string(),
        ];

        let state = AppState::initialize(settings, None)
            .await
            .expect("initialize");

        // Primary plus both well-formed dynamic keys; the malformed one
        // skipped without failing the rest
        assert_eq!(state.keys().len(), 3);
        let guid: KeyGuid = "00000000-0000-0000-0000-000000000002"
            .parse()
            .expect("valid guid");
        assert_eq!(state.keys().key_for(&guid), Some(vec![0xCC, 0xDD]));
    }

    #[tokio::test]
    async fn test_initialize_rejects_malformed_primary_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut settings = settings_for(dir.path());
        settings.archive_key = "not hex".to_string();

        let result = AppState::initialize(settings, None).await;
        assert!(matches!(
            result,
            Err(ServerError::Config(ConfigError::InvalidPrimaryKey(_)))
        ));
    }
}
