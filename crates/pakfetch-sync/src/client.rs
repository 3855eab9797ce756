//! Manifest client
//!
//! Talks to the content-build service: verifies authorization, resolves
//! a release label to its manifest, downloads and parses the manifest,
//! and hands out chunk providers for patched entries.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pakfetch_archive::ArchiveIndex;
use reqwest::Client;
use tracing::info;
use url::Url;

use crate::auth::AuthClient;
use crate::builds::{ContentBuildDescriptor, ContentBuildResponse};
use crate::chunks::ChunkProvider;
use crate::error::{Result, SyncError};
use crate::manifest::Manifest;
use crate::patcher::patch_index;

/// Default token endpoint of the account service
pub const DEFAULT_TOKEN_URL: &str =
    "https://account-public-service-prod03.ol.epicgames.com/account/api/oauth/token";

/// Default client credential presented during the token exchange
pub const DEFAULT_CLIENT_CREDENTIALS: &str =
    "MzQ0NmNkNzI2OTRjNGE0NDg1ZDgxYjc3YWRiYjIxNDE6OTIwOWQ0YTVlMjVhNDU3ZmI5YjA3NDg5ZDMxM2I0MWE=";

/// Default content-builds endpoint of the launcher service
pub const DEFAULT_BUILDS_URL: &str = "https://launcher-public-service-prod06.ol.epicgames.com/launcher/api/public/assets/Windows/5cb97847cee34581afdbc445400e2f77/FortniteContentBuilds";

/// Default chunk base URL of the distribution CDN
pub const DEFAULT_CHUNK_BASE_URL: &str =
    "https://epicgames-download1.akamaized.net/Builds/Fortnite/Content/CloudDir/ChunksV4/";

/// Endpoints and storage locations for one synchronization run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Token endpoint for the client-credential exchange
    pub token_url: String,
    /// Pre-encoded basic credential
    pub client_credentials: String,
    /// Content-builds endpoint, queried with a `label` parameter
    pub builds_url: String,
    /// Chunk base URL used when the manifest declares none
    pub chunk_base_url: String,
    /// On-disk chunk cache directory
    pub chunk_cache_dir: PathBuf,
}

impl SyncOptions {
    /// Options against the default endpoints, caching chunks under
    /// `chunk_cache_dir`
    pub fn new(chunk_cache_dir: PathBuf) -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_credentials: DEFAULT_CLIENT_CREDENTIALS.to_string(),
            builds_url: DEFAULT_BUILDS_URL.to_string(),
            chunk_base_url: DEFAULT_CHUNK_BASE_URL.to_string(),
            chunk_cache_dir,
        }
    }
}

/// Client for build metadata and manifest downloads
pub struct ManifestClient {
    http: Client,
    auth: AuthClient,
    options: SyncOptions,
}

impl ManifestClient {
    /// Create a client with a pooled HTTP connection
    pub fn new(options: SyncOptions) -> Result<Self> {
        let http = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self::with_http(http, options))
    }

    /// Create a client over an existing HTTP client
    pub fn with_http(http: Client, options: SyncOptions) -> Self {
        let auth = AuthClient::new(
            http.clone(),
            options.token_url.clone(),
            options.client_credentials.clone(),
        );

        Self {
            http,
            auth,
            options,
        }
    }

    /// Verify the bearer token, refreshing it if the probe fails
    ///
    /// Returns whether a refresh occurred.
    pub async fn verify_authorization(&self) -> Result<bool> {
        self.auth.verify_authorization().await
    }

    /// Resolve a release-channel label to its content build
    ///
    /// `Ok(None)` means the service answered with no build for the
    /// label; the caller should skip synchronization for this run.
    pub async fn get_content_builds(&self, label: &str) -> Result<Option<ContentBuildDescriptor>> {
        self.verify_authorization().await?;
        let token = self
            .auth
            .access_token()
            .ok_or_else(|| SyncError::Auth("no access token after verification".to_string()))?;

        let response = self
            .http
            .get(&self.options.builds_url)
            .header(reqwest::header::AUTHORIZATION, format!("bearer {token}"))
            .query(&[("label", label)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status,
                context: format!("content builds for label '{label}'"),
            });
        }

        let payload: ContentBuildResponse = response.json().await?;
        Ok(payload.into_descriptor(label))
    }

    /// Download and parse the manifest at `url`
    pub async fn get_manifest(&self, url: &str) -> Result<Manifest> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                status,
                context: format!("manifest at {url}"),
            });
        }

        let body = response.bytes().await?;
        let manifest = Manifest::parse(&body)?;

        info!(
            "Fetched manifest for {} with {} file entries",
            manifest.app_name.as_deref().unwrap_or("<unnamed>"),
            manifest.files.len()
        );

        Ok(manifest)
    }

    /// Chunk provider for a manifest, honoring its declared chunk base
    pub fn chunk_provider(&self, manifest: &Manifest) -> Result<ChunkProvider> {
        let base = manifest
            .chunk_base_uri
            .as_deref()
            .unwrap_or(&self.options.chunk_base_url);

        Ok(ChunkProvider::new(
            self.http.clone(),
            Url::parse(base)?,
            self.options.chunk_cache_dir.clone(),
        ))
    }
}

/// One-shot synchronization: resolve, fetch, and patch
///
/// Returns the number of entries added to the index. A label with no
/// published build patches nothing and returns zero.
pub async fn synchronize(
    index: &ArchiveIndex,
    client: &ManifestClient,
    label: &str,
) -> Result<usize> {
    let Some(build) = client.get_content_builds(label).await? else {
        info!("No content build for label '{label}'; skipping synchronization");
        return Ok(0);
    };

    let manifest_url = build.manifest_url()?;
    let manifest = client.get_manifest(manifest_url.as_str()).await?;
    let provider = Arc::new(client.chunk_provider(&manifest)?);

    Ok(patch_index(index, &manifest, &provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pakfetch_crypto::KeyStore;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_auth(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("authorization", "basic creds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "expires_at": "2026-01-01T00:00:00.000Z",
            })))
            .mount(server)
            .await;
    }

    fn options(server: &MockServer, cache: &std::path::Path) -> SyncOptions {
        SyncOptions {
            token_url: format!("{}/oauth/token", server.uri()),
            client_credentials: "creds".to_string(),
            builds_url: format!("{}/builds", server.uri()),
            chunk_base_url: format!("{}/chunks/", server.uri()),
            chunk_cache_dir: cache.to_path_buf(),
        }
    }

    fn empty_index(dir: &std::path::Path) -> ArchiveIndex {
        ArchiveIndex::build(dir, "UE5_3", std::sync::Arc::new(KeyStore::new()))
            .expect("build index")
    }

    #[tokio::test]
    async fn test_get_content_builds_resolves_descriptor() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("GET"))
            .and(path("/builds"))
            .and(query_param("label", "Live"))
            .and(header("authorization", "bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": {"MANIFEST": {
                    "distribution": "https://cdn.example.com/",
                    "path": "Builds/live.manifest",
                }}
            })))
            .mount(&server)
            .await;

        let cache = tempfile::tempdir().expect("tempdir");
        let client =
            ManifestClient::with_http(Client::new(), options(&server, cache.path()));

        let build = client
            .get_content_builds("Live")
            .await
            .expect("request")
            .expect("descriptor");
        assert_eq!(build.distribution, "https://cdn.example.com/");
        assert_eq!(build.path, "Builds/live.manifest");
    }

    #[tokio::test]
    async fn test_empty_content_builds_skips_synchronization() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("GET"))
            .and(path("/builds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let cache = tempfile::tempdir().expect("tempdir");
        let archives = tempfile::tempdir().expect("tempdir");
        let index = empty_index(archives.path());
        let client =
            ManifestClient::with_http(Client::new(), options(&server, cache.path()));

        // The index stays completely unmodified
        let added = synchronize(&index, &client, "Live").await.expect("sync");
        assert_eq!(added, 0);
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_synchronize_patches_new_entries() {
        let server = MockServer::start().await;
        mock_auth(&server).await;
        Mock::given(method("GET"))
            .and(path("/builds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": {"MANIFEST": {
                    "distribution": server.uri(),
                    "path": "/builds/live.manifest",
                }}
            })))
            .mount(&server)
            .await;
        let manifest_body = r#"{
            "AppNameString": "SampleGame",
            "FileManifestList": [
                {
                    "Filename": "Game/Content/Remote.uasset",
                    "FileChunkParts": [
                        {"Guid": "aabbccdd", "Offset": 0, "Size": 4},
                        {"Guid": "eeff0011", "Offset": 2, "Size": 3}
                    ]
                }
            ]
        }"#;
        Mock::given(method("GET"))
            .and(path("/builds/live.manifest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(manifest_body))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chunks/aabbccdd.chunk"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ABCD".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/chunks/eeff0011.chunk"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"0123456".to_vec()))
            .mount(&server)
            .await;

        let cache = tempfile::tempdir().expect("tempdir");
        let archives = tempfile::tempdir().expect("tempdir");
        let index = empty_index(archives.path());
        let client =
            ManifestClient::with_http(Client::new(), options(&server, cache.path()));

        let added = synchronize(&index, &client, "Live").await.expect("sync");
        assert_eq!(added, 1);

        let data = index
            .read("Game/Content/Remote.uasset")
            .await
            .expect("read patched entry");
        assert_eq!(data, b"ABCD234");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error_not_a_panic() {
        let cache = tempfile::tempdir().expect("tempdir");
        let archives = tempfile::tempdir().expect("tempdir");
        let index = empty_index(archives.path());

        let client = ManifestClient::with_http(
            Client::new(),
            SyncOptions {
                token_url: "http://127.0.0.1:1/oauth/token".to_string(),
                client_credentials: "creds".to_string(),
                builds_url: "http://127.0.0.1:1/builds".to_string(),
                chunk_base_url: "http://127.0.0.1:1/chunks/".to_string(),
                chunk_cache_dir: cache.path().to_path_buf(),
            },
        );

        let result = synchronize(&index, &client, "Live").await;
        assert!(result.is_err());
        assert!(index.is_empty());
    }
}
