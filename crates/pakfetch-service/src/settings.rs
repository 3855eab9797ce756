//! Service settings
//!
//! The service consumes a flat key/value settings namespace; key names
//! match the editor-side settings they are exported from. How the file
//! is produced is out of scope — this module only loads and validates
//! the JSON rendition.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Settings consumed by the service
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Path to the type-mappings file, if one is configured
    #[serde(rename = "MappingFilePath", default)]
    pub mapping_file_path: Option<PathBuf>,

    /// Directory containing the container archives (required)
    #[serde(rename = "ArchiveDirectory")]
    pub archive_directory: PathBuf,

    /// Directory exported assets and the chunk cache live under
    #[serde(rename = "ExportDirectory", default)]
    pub export_directory: Option<PathBuf>,

    /// Primary archive key as hex; empty means no primary key
    #[serde(rename = "ArchiveKey", default)]
    pub archive_key: String,

    /// Dynamic key entries of the form `(Key="<hex>",Guid="<hex>")`
    #[serde(rename = "DynamicKeys", default)]
    pub dynamic_keys: Vec<String>,

    /// Engine version tag the archives were built with
    #[serde(rename = "UnrealVersion", default = "default_version")]
    pub unreal_version: String,

    /// Presentation-only: lower console verbosity when set
    #[serde(rename = "bHideConsole", default)]
    pub hide_console: bool,
}

fn default_version() -> String {
    "GAME_UE5_LATEST".to_string()
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate required inputs
    ///
    /// The archive directory is the one required input; everything else
    /// is optional or recovered at bootstrap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.archive_directory.is_dir() {
            return Err(ConfigError::MissingArchiveDirectory(
                self.archive_directory.clone(),
            ));
        }
        Ok(())
    }

    /// Directory the chunk cache is placed in
    ///
    /// Content-addressed and safe to clear; chunks are re-fetched on
    /// demand.
    pub fn chunk_cache_dir(&self) -> PathBuf {
        self.export_directory
            .as_deref()
            .unwrap_or(&self.archive_directory)
            .join(".chunks")
    }
}
