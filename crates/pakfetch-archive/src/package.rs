//! Package and export object model
//!
//! A package is the unit stored at one logical path: an ordered list of
//! named, typed export objects. Property lists are ordered multimaps —
//! duplicate names are allowed and order is preserved, which the editor
//! data merge depends on.

use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinResult, BinWrite};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::codec::{read_bytes, read_string, write_bytes, write_string};

/// Magic signature of a serialized package
pub const PACKAGE_MAGIC: [u8; 4] = *b"UPK1";

/// Current package format version
pub const PACKAGE_VERSION: u32 = 1;

/// One property value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Str(String),
    /// Ordered list of values
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    const TAG_BOOL: u8 = 0;
    const TAG_INT: u8 = 1;
    const TAG_FLOAT: u8 = 2;
    const TAG_STR: u8 = 3;
    const TAG_ARRAY: u8 = 4;
}

impl BinRead for PropertyValue {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        (): Self::Args<'_>,
    ) -> BinResult<Self> {
        let pos = reader.stream_position()?;
        let tag = u8::read_options(reader, endian, ())?;

        match tag {
            Self::TAG_BOOL => Ok(Self::Bool(u8::read_options(reader, endian, ())? != 0)),
            Self::TAG_INT => Ok(Self::Int(i64::read_options(reader, endian, ())?)),
            Self::TAG_FLOAT => Ok(Self::Float(f64::read_options(reader, endian, ())?)),
            Self::TAG_STR => Ok(Self::Str(read_string(reader, endian)?)),
            Self::TAG_ARRAY => {
                let count = u32::read_options(reader, endian, ())?;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(Self::read_options(reader, endian, ())?);
                }
                Ok(Self::Array(values))
            }
            other => Err(binrw::Error::AssertFail {
                pos,
                message: format!("unknown property tag {other}"),
            }),
        }
    }
}

impl BinWrite for PropertyValue {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        (): Self::Args<'_>,
    ) -> BinResult<()> {
        match self {
            Self::Bool(value) => {
                Self::TAG_BOOL.write_options(writer, endian, ())?;
                u8::from(*value).write_options(writer, endian, ())?;
            }
            Self::Int(value) => {
                Self::TAG_INT.write_options(writer, endian, ())?;
                value.write_options(writer, endian, ())?;
            }
            Self::Float(value) => {
                Self::TAG_FLOAT.write_options(writer, endian, ())?;
                value.write_options(writer, endian, ())?;
            }
            Self::Str(value) => {
                Self::TAG_STR.write_options(writer, endian, ())?;
                write_string(writer, endian, value)?;
            }
            Self::Array(values) => {
                Self::TAG_ARRAY.write_options(writer, endian, ())?;
                (values.len() as u32).write_options(writer, endian, ())?;
                for value in values {
                    value.write_options(writer, endian, ())?;
                }
            }
        }
        Ok(())
    }
}

/// Decoded media payload carried by texture and sound exports
///
/// The bytes are already decoded by the packing pipeline; this layer
/// returns them opaquely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    /// Payload format tag, e.g. `png`, `wem`, `wav`
    pub format: String,
    /// Decoded payload bytes
    pub data: Vec<u8>,
}

/// One named, typed export object serialized inside a package
#[derive(Debug, Clone, PartialEq)]
pub struct ExportObject {
    /// Export name, unique only by convention
    pub name: String,
    /// Package-relative type tag, e.g. `DataAsset`, `Texture2D`
    pub class: String,
    /// Ordered property multimap
    pub properties: Vec<(String, PropertyValue)>,
    /// Optional decoded media payload
    pub payload: Option<MediaPayload>,
}

impl ExportObject {
    /// Create an export with no properties or payload
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            properties: Vec::new(),
            payload: None,
        }
    }

    /// Append properties after the existing ones, keeping both on name
    /// collisions
    pub fn append_properties(&mut self, properties: &[(String, PropertyValue)]) {
        self.properties.extend_from_slice(properties);
    }
}

impl Serialize for ExportObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("Type", &self.class)?;
        map.serialize_entry("Name", &self.name)?;
        map.serialize_entry("Properties", &PropertyList(&self.properties))?;
        map.end()
    }
}

/// Ordered, duplicate-preserving view of a property list
struct PropertyList<'a>(&'a [(String, PropertyValue)]);

impl Serialize for PropertyList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl BinRead for ExportObject {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        (): Self::Args<'_>,
    ) -> BinResult<Self> {
        let name = read_string(reader, endian)?;
        let class = read_string(reader, endian)?;

        let property_count = u32::read_options(reader, endian, ())?;
        let mut properties = Vec::with_capacity(property_count as usize);
        for _ in 0..property_count {
            let key = read_string(reader, endian)?;
            let value = PropertyValue::read_options(reader, endian, ())?;
            properties.push((key, value));
        }

        let has_payload = u8::read_options(reader, endian, ())? != 0;
        let payload = if has_payload {
            Some(MediaPayload {
                format: read_string(reader, endian)?,
                data: read_bytes(reader, endian)?,
            })
        } else {
            None
        };

        Ok(Self {
            name,
            class,
            properties,
            payload,
        })
    }
}

impl BinWrite for ExportObject {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        (): Self::Args<'_>,
    ) -> BinResult<()> {
        write_string(writer, endian, &self.name)?;
        write_string(writer, endian, &self.class)?;

        (self.properties.len() as u32).write_options(writer, endian, ())?;
        for (key, value) in &self.properties {
            write_string(writer, endian, key)?;
            value.write_options(writer, endian, ())?;
        }

        match &self.payload {
            Some(payload) => {
                1u8.write_options(writer, endian, ())?;
                write_string(writer, endian, &payload.format)?;
                write_bytes(writer, endian, &payload.data)?;
            }
            None => 0u8.write_options(writer, endian, ())?,
        }

        Ok(())
    }
}

/// A parsed package: ordered exports behind one logical path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    /// Exports in package order
    pub exports: Vec<ExportObject>,
}

impl Package {
    /// Parse a package from its raw bytes
    pub fn parse(data: &[u8]) -> BinResult<Self> {
        let mut cursor = binrw::io::Cursor::new(data);

        let magic = <[u8; 4]>::read_le(&mut cursor)?;
        if magic != PACKAGE_MAGIC {
            return Err(binrw::Error::AssertFail {
                pos: 0,
                message: format!("bad package magic {magic:?}"),
            });
        }

        let version = u32::read_le(&mut cursor)?;
        if version != PACKAGE_VERSION {
            return Err(binrw::Error::AssertFail {
                pos: 4,
                message: format!("unsupported package version {version}"),
            });
        }

        let count = u32::read_le(&mut cursor)?;
        let mut exports = Vec::with_capacity(count as usize);
        for _ in 0..count {
            exports.push(ExportObject::read_le(&mut cursor)?);
        }

        Ok(Self { exports })
    }

    /// Serialize the package to bytes
    pub fn build(&self) -> BinResult<Vec<u8>> {
        let mut cursor = binrw::io::Cursor::new(Vec::new());

        PACKAGE_MAGIC.write_le(&mut cursor)?;
        PACKAGE_VERSION.write_le(&mut cursor)?;
        (self.exports.len() as u32).write_le(&mut cursor)?;
        for export in &self.exports {
            export.write_le(&mut cursor)?;
        }

        Ok(cursor.into_inner())
    }

    /// First export with the given name, if any
    pub fn export_named(&self, name: &str) -> Option<&ExportObject> {
        self.exports.iter().find(|export| export.name == name)
    }
}

impl From<Vec<ExportObject>> for Package {
    fn from(exports: Vec<ExportObject>) -> Self {
        Self { exports }
    }
}
