//! Shared binary codec helpers

use binrw::{BinRead, BinResult, BinWrite};
use std::io::{Read, Seek, Write};

/// Read a length-prefixed UTF-8 string
pub(crate) fn read_string<R: Read + Seek>(
    reader: &mut R,
    endian: binrw::Endian,
) -> BinResult<String> {
    let len = u32::read_options(reader, endian, ())?;
    let pos = reader.stream_position()?;

    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;

    String::from_utf8(bytes).map_err(|_| binrw::Error::AssertFail {
        pos,
        message: "string is not valid UTF-8".to_string(),
    })
}

/// Write a length-prefixed UTF-8 string
pub(crate) fn write_string<W: Write + Seek>(
    writer: &mut W,
    endian: binrw::Endian,
    value: &str,
) -> BinResult<()> {
    (value.len() as u32).write_options(writer, endian, ())?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Read a length-prefixed byte buffer
pub(crate) fn read_bytes<R: Read + Seek>(
    reader: &mut R,
    endian: binrw::Endian,
) -> BinResult<Vec<u8>> {
    let len = u32::read_options(reader, endian, ())?;
    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Write a length-prefixed byte buffer
pub(crate) fn write_bytes<W: Write + Seek>(
    writer: &mut W,
    endian: binrw::Endian,
    value: &[u8],
) -> BinResult<()> {
    (value.len() as u32).write_options(writer, endian, ())?;
    writer.write_all(value)?;
    Ok(())
}
