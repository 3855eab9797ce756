//! Chunked-manifest model
//!
//! A manifest describes the files of one content build as ordered chunk
//! compositions. This module is a thin parsing layer: the chunk scheme
//! itself stays behind [`crate::chunks`].

use serde::Deserialize;

use crate::error::{Result, SyncError};

/// One chunk part: a byte range within a content-addressed chunk
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChunkPart {
    /// Content identifier of the chunk
    #[serde(rename = "Guid")]
    pub guid: String,
    /// Byte offset within the chunk
    #[serde(rename = "Offset")]
    pub offset: u64,
    /// Number of bytes taken from the chunk
    #[serde(rename = "Size")]
    pub size: u64,
}

/// One file entry: a name and the ordered chunk parts that rebuild it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestFileEntry {
    /// Logical file name
    #[serde(rename = "Filename")]
    pub filename: String,
    /// Chunk parts in concatenation order
    #[serde(rename = "FileChunkParts", default)]
    pub chunk_parts: Vec<ChunkPart>,
}

impl ManifestFileEntry {
    /// Total plain size of the file
    pub fn total_size(&self) -> u64 {
        self.chunk_parts.iter().map(|part| part.size).sum()
    }
}

/// A parsed content-build manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Manifest format version string
    #[serde(rename = "ManifestFileVersion", default)]
    pub version: Option<String>,
    /// Application the build belongs to
    #[serde(rename = "AppNameString", default)]
    pub app_name: Option<String>,
    /// Chunk base URI declared by the manifest, if any
    #[serde(rename = "ChunkBaseUri", default)]
    pub chunk_base_uri: Option<String>,
    /// File entries in manifest order
    #[serde(rename = "FileManifestList", default)]
    pub files: Vec<ManifestFileEntry>,
}

impl Manifest {
    /// Parse a manifest body
    pub fn parse(data: &[u8]) -> Result<Self> {
        let manifest: Self = serde_json::from_slice(data)?;

        for file in &manifest.files {
            if file.filename.is_empty() {
                return Err(SyncError::Manifest("file entry with empty name".to_string()));
            }
            if file.chunk_parts.is_empty() {
                return Err(SyncError::Manifest(format!(
                    "file '{}' has no chunk parts",
                    file.filename
                )));
            }
        }

        Ok(manifest)
    }
}
