//! Request façade
//!
//! The one entry point external collaborators call:
//! `resolve(path, raw)` orchestrates the virtual file index and the
//! editor-data merge, classifies the resolved object once, and returns
//! either serialized JSON or a binary media payload.

use std::sync::Arc;

use pakfetch_archive::merge::merge_exports;
use pakfetch_archive::{ArchiveIndex, ExportObject};
use serde::Serialize;
use tracing::debug;

use crate::error::RequestError;

/// Export class tag of texture objects
const TEXTURE_CLASS: &str = "Texture2D";

/// Export class tag of sound objects
const AUDIO_CLASS: &str = "SoundWave";

/// Asset extension appended to normalized request paths
const ASSET_EXTENSION: &str = ".uasset";

/// Successful resolution result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Pretty-printed JSON body (`{"jsonOutput": [...]}`)
    Json(String),
    /// Binary media payload
    Binary {
        /// MIME content type of the payload
        content_type: String,
        /// Payload bytes
        data: Vec<u8>,
    },
}

/// Classification of a resolved object, decided once per request
enum ClassifiedAsset {
    /// A texture export carrying decoded image data
    Texture(ExportObject),
    /// A sound export carrying decoded audio data
    Audio(ExportObject),
    /// Anything else: handled as serialized exports
    Generic,
}

impl ClassifiedAsset {
    fn classify(exports: &[ExportObject]) -> Self {
        for export in exports {
            match export.class.as_str() {
                TEXTURE_CLASS => return Self::Texture(export.clone()),
                AUDIO_CLASS => return Self::Audio(export.clone()),
                _ => {}
            }
        }
        Self::Generic
    }
}

#[derive(Serialize)]
struct JsonEnvelope<'a> {
    #[serde(rename = "jsonOutput")]
    json_output: &'a [ExportObject],
}

/// The façade the request-routing layer talks to
#[derive(Clone)]
pub struct RequestService {
    index: Arc<ArchiveIndex>,
}

impl RequestService {
    /// Create a service over a built index
    pub fn new(index: Arc<ArchiveIndex>) -> Self {
        Self { index }
    }

    /// The underlying virtual file index
    pub fn index(&self) -> &Arc<ArchiveIndex> {
        &self.index
    }

    /// Resolve a request path
    ///
    /// With `raw` set — or when the object is not a recognized media
    /// type — the result is the merged export sequence as pretty-printed
    /// JSON. Otherwise textures and sounds return their decoded payload
    /// with a format-derived content type.
    pub async fn resolve(&self, path: &str, raw: bool) -> Result<Resolved, RequestError> {
        let path = normalize_asset_path(path);
        debug!("Resolving {path} (raw: {raw})");

        if raw {
            return self.resolve_exports(&path).await;
        }

        let exports = self
            .index
            .load_all_objects(&path)
            .await
            .map_err(|e| RequestError::from_archive(&path, e))?;

        match ClassifiedAsset::classify(&exports) {
            ClassifiedAsset::Texture(export) => texture_payload(&export),
            ClassifiedAsset::Audio(export) => audio_payload(&export),
            ClassifiedAsset::Generic => self.resolve_exports(&path).await,
        }
    }

    /// Merge and serialize the export sequence behind a path
    async fn resolve_exports(&self, path: &str) -> Result<Resolved, RequestError> {
        let exports = merge_exports(&self.index, path)
            .await
            .map_err(|e| RequestError::from_archive(path, e))?;

        let body = serde_json::to_string_pretty(&JsonEnvelope {
            json_output: &exports,
        })?;

        Ok(Resolved::Json(body))
    }
}

/// Normalize a request path: strip everything from the first `.` onward
/// and append the asset extension
fn normalize_asset_path(path: &str) -> String {
    let stem = path.split('.').next().unwrap_or(path);
    format!("{stem}{ASSET_EXTENSION}")
}

fn texture_payload(export: &ExportObject) -> Result<Resolved, RequestError> {
    match &export.payload {
        Some(payload) if !payload.data.is_empty() => Ok(Resolved::Binary {
            content_type: "image/png".to_string(),
            data: payload.data.clone(),
        }),
        _ => Err(decode_failure("Invalid texture data, exported as json", export)),
    }
}

fn audio_payload(export: &ExportObject) -> Result<Resolved, RequestError> {
    match &export.payload {
        Some(payload) if !payload.data.is_empty() => Ok(Resolved::Binary {
            content_type: audio_mime(&payload.format).to_string(),
            data: payload.data.clone(),
        }),
        _ => Err(decode_failure("Invalid audio data, exported as json", export)),
    }
}

/// Content type by decoded audio format
fn audio_mime(format: &str) -> &'static str {
    match format.to_lowercase().as_str() {
        "wem" => "application/vnd.wwise.wem",
        "wav" => "audio/wav",
        "adpcm" => "audio/adpcm",
        "opus" => "audio/opus",
        _ => "audio/ogg",
    }
}

fn decode_failure(note: &str, export: &ExportObject) -> RequestError {
    RequestError::Decode {
        note: note.to_string(),
        json_output: serde_json::to_value(export).unwrap_or(serde_json::Value::Null),
    }
}
