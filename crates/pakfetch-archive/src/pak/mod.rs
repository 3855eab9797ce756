//! Container archive format
//!
//! One fixed scheme: packed entry data, a plaintext index, and a trailing
//! footer locating the index and naming the encryption key GUID. Entry
//! data may be AES-encrypted; decryption happens lazily, only when an
//! entry is actually read.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use binrw::BinRead;
use pakfetch_crypto::{KeyGuid, KeyStore, encryption};
use tracing::debug;

use crate::error::{ArchiveError, Result};

pub mod builder;
pub mod footer;
pub mod index;

pub use builder::PakBuilder;
pub use footer::{FOOTER_SIZE, PAK_MAGIC, PAK_VERSION, PakFooter};
pub use index::{PakEntry, PakIndex};

/// An opened container archive
///
/// Holds the parsed footer and index; entry data is read from the
/// underlying file on demand.
#[derive(Debug)]
pub struct PakArchive {
    path: PathBuf,
    footer: PakFooter,
    entries: Vec<PakEntry>,
}

impl PakArchive {
    /// Open a container file and parse its footer and index
    ///
    /// Only the index is read here; entry data (and any decryption) is
    /// deferred until [`Self::read_entry`].
    pub fn open(path: &Path) -> Result<Self> {
        let io_err = |source| ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let file_len = file.metadata().map_err(io_err)?.len();

        if file_len < FOOTER_SIZE {
            return Err(ArchiveError::InvalidContainer {
                path: path.to_path_buf(),
                reason: format!("file too short for footer: {file_len} bytes"),
            });
        }

        file.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))
            .map_err(io_err)?;
        let mut footer_bytes = vec![0u8; FOOTER_SIZE as usize];
        file.read_exact(&mut footer_bytes).map_err(io_err)?;

        let footer = PakFooter::read(&mut binrw::io::Cursor::new(&footer_bytes)).map_err(|e| {
            ArchiveError::InvalidContainer {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        footer.validate(path, file_len)?;

        file.seek(SeekFrom::Start(footer.index_offset))
            .map_err(io_err)?;
        let mut index_bytes = vec![0u8; footer.index_size as usize];
        file.read_exact(&mut index_bytes).map_err(io_err)?;

        let index = PakIndex::parse(&index_bytes).map_err(|e| ArchiveError::InvalidContainer {
            path: path.to_path_buf(),
            reason: format!("bad index: {e}"),
        })?;

        debug!(
            "Opened container {} with {} entries (key GUID {})",
            path.display(),
            index.entries.len(),
            footer.key_guid()
        );

        Ok(Self {
            path: path.to_path_buf(),
            footer,
            entries: index.entries,
        })
    }

    /// File system path of the container
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// GUID of the key this container's encrypted entries need
    pub const fn key_guid(&self) -> KeyGuid {
        self.footer.key_guid()
    }

    /// Entries in pack order
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Read one entry's plain bytes
    ///
    /// Encrypted entries look their key up in `keys` at read time; a
    /// missing key yields [`ArchiveError::KeyNotFound`] without touching
    /// the rest of the archive.
    pub fn read_entry(&self, entry: &PakEntry, keys: &KeyStore) -> Result<Vec<u8>> {
        let io_err = |source| ArchiveError::Io {
            path: self.path.clone(),
            source,
        };

        let mut file = File::open(&self.path).map_err(io_err)?;
        file.seek(SeekFrom::Start(entry.offset)).map_err(io_err)?;

        let mut data = vec![0u8; entry.stored_size() as usize];
        file.read_exact(&mut data).map_err(io_err)?;

        if entry.is_encrypted() {
            let guid = self.key_guid();
            let material = keys
                .key_for(&guid)
                .ok_or(ArchiveError::KeyNotFound(guid))?;
            encryption::decrypt_in_place(&material, &mut data)?;
            data.truncate(entry.size as usize);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_key() -> Vec<u8> {
        vec![0x24; encryption::KEY_SIZE]
    }

    #[test]
    fn test_build_and_read_plain_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("plain.pak");

        PakBuilder::new()
            .add_file("Game/Content/Foo.uasset", b"hello".to_vec())
            .add_file("Game/Content/Bar.uasset", b"world!".to_vec())
            .write_to(&target)
            .expect("write container");

        let archive = PakArchive::open(&target).expect("open container");
        assert_eq!(archive.entries().len(), 2);
        assert!(archive.key_guid().is_zero());

        let keys = KeyStore::new();
        let entry = &archive.entries()[1];
        assert_eq!(entry.path, "Game/Content/Bar.uasset");
        let data = archive.read_entry(entry, &keys).expect("read entry");
        assert_eq!(data, b"world!");
    }

    #[test]
    fn test_encrypted_entry_lazy_key_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("secret.pak");
        let guid: KeyGuid = "00000000-0000-0000-0000-000000000001"
            .parse()
            .expect("valid guid");

        PakBuilder::new()
            .encryption_key(guid, test_key())
            .add_encrypted_file("Game/Secret.uasset", b"classified".to_vec())
            .write_to(&target)
            .expect("write container");

        // Opening and indexing succeeds without the key
        let archive = PakArchive::open(&target).expect("open container");
        assert_eq!(archive.entries().len(), 1);

        // Reading without the key fails with a typed error
        let keys = KeyStore::new();
        let entry = &archive.entries()[0];
        let result = archive.read_entry(entry, &keys);
        assert!(matches!(result, Err(ArchiveError::KeyNotFound(g)) if g == guid));

        // Submitting the key afterwards makes the same entry readable
        keys.submit(guid, test_key());
        let data = archive.read_entry(entry, &keys).expect("read entry");
        assert_eq!(data, b"classified");
    }

    #[test]
    fn test_open_rejects_truncated_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("short.pak");
        std::fs::write(&target, b"tiny").expect("write file");

        let result = PakArchive::open(&target);
        assert!(matches!(
            result,
            Err(ArchiveError::InvalidContainer { .. })
        ));
    }
}
