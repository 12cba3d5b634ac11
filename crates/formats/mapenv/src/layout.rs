//! Fixed byte contracts of the MAP_ENV container.
//!
//! ```text
//! +--------------------+ 0
//! | header (16 bytes)  |
//! +--------------------+ 16
//! | entry records      |  padded with 0xFF to 16
//! +--------------------+ header.string_blob_offset
//! | string blob        |  NUL-terminated Shift_JIS strings, padded
//! +--------------------+ string_blob_offset + string_blob_len
//! | tag table          |  hash -> name directory, padded
//! +--------------------+
//! ```

use crate::cursor::{Cursor, Writer};
use crate::error::{Error, Result};

/// Size of the file header and offset of the first entry record.
pub const HEADER_SIZE: usize = 16;
/// Every variable-length region is padded to this boundary.
pub const ALIGNMENT: usize = 16;
/// Padding byte for regions and reserved descriptor bytes.
pub const FILLER: u8 = 0xFF;

/// First string in every blob.
pub const ROOT_MARKER: &str = "MAP_ENV";
/// Key prefix that selects the root flavor of a `PTREE` record.
pub const ROOT_KEY_PREFIX: &str = "MAP_ENV ";

/// Payload of a `_PTREE` record. Closing a scope carries no data.
pub const CLOSE_PAYLOAD: [u8; 4] = [0x00, FILLER, FILLER, FILLER];

/// Descriptor byte 0 of a plain `PTREE` / unlabeled `PTVAL`.
pub const FLAVOR_PLAIN: u8 = 1;
/// Descriptor byte 0 of a root `PTREE` / labeled `PTVAL`.
pub const FLAVOR_EXTENDED: u8 = 2;

/// Sentinel closing every tag table.
pub const TAG_TABLE_TRAILER: [u8; 10] = [0x01, 0x74, 0x32, 0x62, 0xFE, 0x01, 0x00, 0x00, 0x01, 0x00];

/// Narrow a size or count to a `u32` header field.
pub fn u32_field(size: usize, what: &'static str) -> Result<u32> {
    u32::try_from(size).map_err(|_| Error::TooLarge { what, size })
}

/// Record tags. On disk each is the CRC-32 of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// `PTREE`: open a scope.
    Tree,
    /// `_PTREE`: close the innermost scope.
    TreeEnd,
    /// `PTVAL`: scalar leaf.
    Value,
    /// `PTVALS`: list leaf.
    Values,
}

impl Tag {
    pub const ALL: [Tag; 4] = [Tag::Tree, Tag::TreeEnd, Tag::Value, Tag::Values];

    pub fn name(self) -> &'static str {
        match self {
            Tag::Tree => "PTREE",
            Tag::TreeEnd => "_PTREE",
            Tag::Value => "PTVAL",
            Tag::Values => "PTVALS",
        }
    }

    /// CRC-32 of [`Tag::name`], as stored in entry records.
    pub fn hash(self) -> u32 {
        crc32fast::hash(self.name().as_bytes())
    }

    pub fn from_hash(hash: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.hash() == hash)
    }
}

/// Value kind stored in byte 1 of a `PTVAL` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueKind {
    Integer = 1,
    Float = 2,
}

impl ValueKind {
    /// Kind 0 is read as an integer too.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 | 1 => Some(Self::Integer),
            2 => Some(Self::Float),
            _ => None,
        }
    }
}

/// The 16-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Number of entry records.
    pub entry_count: u32,
    /// Absolute offset of the string blob (header + padded entry region).
    pub string_blob_offset: u32,
    /// Padded length of the string blob.
    pub string_blob_len: u32,
    /// Number of strings in the blob, seed included. Informational only.
    pub string_count: u32,
}

impl FileHeader {
    pub fn parse(c: &mut Cursor<'_>) -> Result<Self> {
        Ok(Self {
            entry_count: c.read_u32()?,
            string_blob_offset: c.read_u32()?,
            string_blob_len: c.read_u32()?,
            string_count: c.read_u32()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_u32(self.entry_count);
        w.write_u32(self.string_blob_offset);
        w.write_u32(self.string_blob_len);
        w.write_u32(self.string_count);
    }

    /// Absolute offset of the tag table.
    pub fn tag_table_offset(&self) -> usize {
        self.string_blob_offset as usize + self.string_blob_len as usize
    }
}
