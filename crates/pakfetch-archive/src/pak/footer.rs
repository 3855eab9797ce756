//! Container footer parsing and building

use binrw::{BinRead, BinWrite};
use pakfetch_crypto::KeyGuid;

use crate::error::{ArchiveError, Result};

/// Magic signature of a container file, at the start of the footer
pub const PAK_MAGIC: [u8; 4] = *b"PAK1";

/// Current container format version
pub const PAK_VERSION: u32 = 1;

/// Size of the footer record at the end of every container file
pub const FOOTER_SIZE: u64 = 41;

/// Container footer
///
/// The footer sits at the very end of the file and locates the index:
/// - Magic signature `PAK1` (4 bytes)
/// - Format version (4 bytes)
/// - Encryption key GUID (16 bytes, all-zero for the primary key)
/// - Flags (1 byte, reserved)
/// - Index offset and size (8 + 8 bytes)
///
/// All multi-byte fields are little-endian.
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct PakFooter {
    /// Magic signature, always `PAK1`
    #[br(assert(magic == PAK_MAGIC, "Invalid container magic: expected 'PAK1', got {:?}", magic))]
    pub magic: [u8; 4],

    /// Format version, currently 1
    pub version: u32,

    /// GUID of the key that decrypts this container's encrypted entries
    pub encryption_guid: [u8; 16],

    /// Reserved flags
    pub flags: u8,

    /// Byte offset of the index within the file
    pub index_offset: u64,

    /// Byte size of the index
    pub index_size: u64,
}

impl PakFooter {
    /// Create a footer for a freshly built container
    pub fn new(encryption_guid: KeyGuid, index_offset: u64, index_size: u64) -> Self {
        Self {
            magic: PAK_MAGIC,
            version: PAK_VERSION,
            encryption_guid: *encryption_guid.as_bytes(),
            flags: 0,
            index_offset,
            index_size,
        }
    }

    /// The encryption key identifier as a [`KeyGuid`]
    pub const fn key_guid(&self) -> KeyGuid {
        KeyGuid::from_bytes(self.encryption_guid)
    }

    /// Validate the footer fields against a known file length
    pub fn validate(&self, container: &std::path::Path, file_len: u64) -> Result<()> {
        if self.magic != PAK_MAGIC {
            return Err(ArchiveError::InvalidContainer {
                path: container.to_path_buf(),
                reason: format!("bad magic {:?}", self.magic),
            });
        }

        if self.version != PAK_VERSION {
            return Err(ArchiveError::InvalidContainer {
                path: container.to_path_buf(),
                reason: format!("unsupported version {}", self.version),
            });
        }

        let data_end = file_len.saturating_sub(FOOTER_SIZE);
        if self.index_offset > data_end || self.index_size > data_end - self.index_offset {
            return Err(ArchiveError::InvalidContainer {
                path: container.to_path_buf(),
                reason: format!(
                    "index extent {}+{} exceeds file length {file_len}",
                    self.index_offset, self.index_size
                ),
            });
        }

        Ok(())
    }
}
