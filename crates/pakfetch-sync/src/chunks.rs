//! Chunk fetching and reassembly
//!
//! Chunks are content-addressed byte blobs served under a base URL and
//! cached on disk by identifier. The cache directory is safe to clear;
//! every chunk can be re-fetched.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use pakfetch_archive::RemoteFileSource;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{Result, SyncError};
use crate::manifest::ManifestFileEntry;

/// Downloads chunks by content identifier, caching them on disk
pub struct ChunkProvider {
    http: Client,
    base_url: Url,
    cache_dir: PathBuf,
}

impl ChunkProvider {
    /// Create a provider over a chunk base URL and cache directory
    pub fn new(http: Client, base_url: Url, cache_dir: PathBuf) -> Self {
        Self {
            http,
            base_url,
            cache_dir,
        }
    }

    /// Cache directory chunks are stored in
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Fetch one chunk's bytes, from cache when possible
    pub async fn fetch(&self, guid: &str) -> Result<Vec<u8>> {
        // Identifiers become cache file names; restrict them accordingly
        if guid.is_empty()
            || !guid
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(SyncError::Manifest(format!("invalid chunk id '{guid}'")));
        }

        let cache_path = self.cache_dir.join(format!("{guid}.chunk"));
        if cache_path.is_file() {
            debug!("Chunk {guid} served from cache");
            return tokio::fs::read(&cache_path)
                .await
                .map_err(|source| SyncError::CacheIo {
                    path: cache_path,
                    source,
                });
        }

        let url = self.base_url.join(&format!("{guid}.chunk"))?;
        debug!("Downloading chunk {guid} from {url}");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status,
                context: format!("chunk {guid}"),
            });
        }

        let bytes = response.bytes().await?.to_vec();

        tokio::fs::create_dir_all(&self.cache_dir)
            .await
            .map_err(|source| SyncError::CacheIo {
                path: self.cache_dir.clone(),
                source,
            })?;
        tokio::fs::write(&cache_path, &bytes)
            .await
            .map_err(|source| SyncError::CacheIo {
                path: cache_path,
                source,
            })?;

        Ok(bytes)
    }
}

/// A manifest file entry backed by chunk downloads
///
/// Implements the archive layer's [`RemoteFileSource`] so patched
/// entries read transparently through the virtual file index.
pub struct ChunkedFile {
    entry: ManifestFileEntry,
    provider: Arc<ChunkProvider>,
}

impl ChunkedFile {
    /// Bind a manifest entry to a chunk provider
    pub fn new(entry: ManifestFileEntry, provider: Arc<ChunkProvider>) -> Self {
        Self { entry, provider }
    }

    async fn assemble(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.entry.total_size() as usize);

        for part in &self.entry.chunk_parts {
            let chunk = self.provider.fetch(&part.guid).await?;

            let start = part.offset as usize;
            let end = start + part.size as usize;
            if end > chunk.len() {
                return Err(SyncError::Manifest(format!(
                    "chunk {} too short for range {}+{} in '{}'",
                    part.guid, part.offset, part.size, self.entry.filename
                )));
            }

            data.extend_from_slice(&chunk[start..end]);
        }

        Ok(data)
    }
}

#[async_trait]
impl RemoteFileSource for ChunkedFile {
    async fn read(&self) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.assemble().await?)
    }
}
