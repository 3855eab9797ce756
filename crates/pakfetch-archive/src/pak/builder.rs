//! Container builder
//!
//! Writes container files in the fixed footer/index layout. Used by tests
//! and packing tools; the service itself never writes archives.

use std::io::Write;
use std::path::Path;

use binrw::BinWrite;
use pakfetch_crypto::{KeyGuid, encryption};

use crate::error::{ArchiveError, Result};
use crate::pak::footer::PakFooter;
use crate::pak::index::{PakEntry, PakIndex};

struct PendingFile {
    path: String,
    data: Vec<u8>,
    encrypted: bool,
}

/// Builder for container files
///
/// ```no_run
/// use pakfetch_archive::pak::PakBuilder;
///
/// PakBuilder::new()
///     .add_file("Game/Content/Foo.uasset", vec![1, 2, 3])
///     .write_to("archive.pak".as_ref())?;
/// # Ok::<(), pakfetch_archive::ArchiveError>(())
/// ```
#[derive(Default)]
pub struct PakBuilder {
    encryption: Option<(KeyGuid, Vec<u8>)>,
    files: Vec<PendingFile>,
}

impl PakBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key used for entries added with [`Self::add_encrypted_file`]
    ///
    /// The GUID is recorded in the footer so readers can look the key up
    /// at read time.
    pub fn encryption_key(mut self, guid: KeyGuid, material: Vec<u8>) -> Self {
        self.encryption = Some((guid, material));
        self
    }

    /// Add a plaintext entry
    pub fn add_file(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.push(PendingFile {
            path: path.into(),
            data,
            encrypted: false,
        });
        self
    }

    /// Add an entry whose data is encrypted with the configured key
    pub fn add_encrypted_file(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.files.push(PendingFile {
            path: path.into(),
            data,
            encrypted: true,
        });
        self
    }

    /// Write the container to disk
    pub fn write_to(self, target: &Path) -> Result<()> {
        let io_err = |source| ArchiveError::Io {
            path: target.to_path_buf(),
            source,
        };

        let encryption_guid = self
            .encryption
            .as_ref()
            .map_or(KeyGuid::ZERO, |(guid, _)| *guid);

        let mut data_section = Vec::new();
        let mut entries = Vec::with_capacity(self.files.len());

        for file in self.files {
            let offset = data_section.len() as u64;
            let size = file.data.len() as u64;
            let mut payload = file.data;
            let mut flags = 0u8;

            if file.encrypted {
                let (_, material) = self.encryption.as_ref().ok_or_else(|| {
                    ArchiveError::InvalidContainer {
                        path: target.to_path_buf(),
                        reason: format!(
                            "encrypted entry '{}' without an encryption key",
                            file.path
                        ),
                    }
                })?;

                payload.resize(encryption::padded_len(payload.len()), 0);
                encryption::encrypt_in_place(material, &mut payload)?;
                flags |= PakEntry::FLAG_ENCRYPTED;
            }

            data_section.extend_from_slice(&payload);
            entries.push(PakEntry {
                path: file.path,
                offset,
                size,
                flags,
            });
        }

        let index = PakIndex { entries };
        let index_bytes = index
            .build()
            .map_err(|e| ArchiveError::InvalidContainer {
                path: target.to_path_buf(),
                reason: format!("failed to encode index: {e}"),
            })?;

        let footer = PakFooter::new(
            encryption_guid,
            data_section.len() as u64,
            index_bytes.len() as u64,
        );

        let mut footer_bytes = binrw::io::Cursor::new(Vec::new());
        footer
            .write(&mut footer_bytes)
            .map_err(|e| ArchiveError::InvalidContainer {
                path: target.to_path_buf(),
                reason: format!("failed to encode footer: {e}"),
            })?;

        let mut file = std::fs::File::create(target).map_err(io_err)?;
        file.write_all(&data_section).map_err(io_err)?;
        file.write_all(&index_bytes).map_err(io_err)?;
        file.write_all(footer_bytes.get_ref()).map_err(io_err)?;

        Ok(())
    }
}
