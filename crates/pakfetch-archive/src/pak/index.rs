//! Container index parsing and building
//!
//! The index is a plaintext record list locating every packed entry.
//! Entry data may be encrypted; the index itself never is, so paths stay
//! enumerable even when the decryption key is not yet available.

use binrw::{BinRead, BinResult, BinWrite};
use std::io::{Read, Seek, Write};

use pakfetch_crypto::encryption;

use crate::codec::{read_string, write_string};

/// One packed entry as recorded in the container index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Logical path, `/`-separated
    pub path: String,
    /// Byte offset of the entry data within the container
    pub offset: u64,
    /// Plain (unpadded) size of the entry data
    pub size: u64,
    /// Entry flags
    pub flags: u8,
}

impl PakEntry {
    /// Flag bit marking AES-encrypted entry data
    pub const FLAG_ENCRYPTED: u8 = 0b0000_0001;

    /// Whether the entry data is encrypted
    pub const fn is_encrypted(&self) -> bool {
        self.flags & Self::FLAG_ENCRYPTED != 0
    }

    /// On-disk extent of the entry data
    ///
    /// Encrypted entries are stored zero-padded to a whole number of
    /// cipher blocks.
    pub const fn stored_size(&self) -> u64 {
        if self.is_encrypted() {
            encryption::padded_len(self.size as usize) as u64
        } else {
            self.size
        }
    }
}

impl BinRead for PakEntry {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        (): Self::Args<'_>,
    ) -> BinResult<Self> {
        let path = read_string(reader, endian)?;
        let offset = u64::read_options(reader, endian, ())?;
        let size = u64::read_options(reader, endian, ())?;
        let flags = u8::read_options(reader, endian, ())?;

        Ok(Self {
            path,
            offset,
            size,
            flags,
        })
    }
}

impl BinWrite for PakEntry {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        (): Self::Args<'_>,
    ) -> BinResult<()> {
        write_string(writer, endian, &self.path)?;
        self.offset.write_options(writer, endian, ())?;
        self.size.write_options(writer, endian, ())?;
        self.flags.write_options(writer, endian, ())?;
        Ok(())
    }
}

/// Parsed container index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PakIndex {
    /// Entries in pack order
    pub entries: Vec<PakEntry>,
}

impl PakIndex {
    /// Parse an index from its raw bytes
    pub fn parse(data: &[u8]) -> BinResult<Self> {
        let mut cursor = binrw::io::Cursor::new(data);
        let count = u32::read_le(&mut cursor)?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entries.push(PakEntry::read_le(&mut cursor)?);
        }

        Ok(Self { entries })
    }

    /// Serialize the index to bytes
    pub fn build(&self) -> BinResult<Vec<u8>> {
        let mut cursor = binrw::io::Cursor::new(Vec::new());
        (self.entries.len() as u32).write_le(&mut cursor)?;
        for entry in &self.entries {
            entry.write_le(&mut cursor)?;
        }
        Ok(cursor.into_inner())
    }
}
