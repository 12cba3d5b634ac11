//! Trailing directory that maps tag hashes back to tag names.
//!
//! ```text
//! u32 table_len      16 + directory + text section (trailer excluded)
//! u32 tag_count
//! u32 text_offset    relative to the table start
//! u32 text_len       unpadded
//! directory          tag_count x (u32 hash, u32 reserved), padded
//! text section       tag_count x (name, 4 x 00), padded
//! trailer            TAG_TABLE_TRAILER
//! padding
//! ```
//!
//! Older files always claim three tags. When fewer were used, the missing
//! directory slots hold filler and the text section simply ends early.

use log::debug;

use crate::cursor::{Cursor, Writer};
use crate::encoding;
use crate::error::{Error, Result};
use crate::layout::{Tag, TAG_TABLE_TRAILER};

const SUB_HEADER_SIZE: usize = 16;
const NAME_TERMINATOR: [u8; 4] = [0; 4];

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub hash: u32,
    pub name: String,
}

/// Parsed tag table.
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    pub entries: Vec<TagEntry>,
}

impl TagTable {
    /// Build the on-disk table for `tags`, in the given order.
    pub fn build(tags: &[Tag]) -> Vec<u8> {
        let mut dir = Writer::default();
        for tag in tags {
            dir.write_u32(tag.hash());
            dir.write_u32(0);
        }
        dir.pad_block();
        let dir = dir.into_bytes();

        let mut text = Writer::default();
        for tag in tags {
            text.write_bytes(tag.name().as_bytes());
            text.write_bytes(&NAME_TERMINATOR);
        }
        let text_len = text.position();
        text.pad_block();
        let text = text.into_bytes();

        let mut w = Writer::with_capacity(SUB_HEADER_SIZE + dir.len() + text.len() + 32);
        w.write_u32((SUB_HEADER_SIZE + dir.len() + text.len()) as u32);
        w.write_u32(tags.len() as u32);
        w.write_u32((SUB_HEADER_SIZE + dir.len()) as u32);
        w.write_u32(text_len as u32);
        w.write_bytes(&dir);
        w.write_bytes(&text);
        w.write_bytes(&TAG_TABLE_TRAILER);
        w.pad_block();
        w.into_bytes()
    }

    /// Parse a table. `data` is the whole file; `offset` is where the table starts.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let mut c = Cursor::new(data).at_offset(offset);
        let _table_len = c.read_u32()?;
        let count = c.read_u32()? as usize;
        let text_offset = c.read_u32()? as usize;
        let text_len = c.read_u32()? as usize;

        let mut text = c.at_offset(offset + text_offset);
        let text = text.read_bytes(text_len)?;
        let mut name_pos = 0;

        let mut entries = Vec::with_capacity(count.min(Tag::ALL.len()));
        for index in 0..count {
            if name_pos >= text.len() {
                debug!("tag table claims {count} tags, names end after {index}");
                break;
            }
            let hash = c.read_u32()?;
            let _reserved = c.read_u32()?;

            let rest = text.get(name_pos..).unwrap_or_default();
            let len = rest.iter().position(|&b| b == 0).ok_or(Error::InvalidHeader {
                message: format!("tag name at {:#x} is not terminated", offset + text_offset + name_pos),
            })?;
            let name = encoding::decode(&rest[..len], offset + text_offset + name_pos)?;
            name_pos += len + NAME_TERMINATOR.len();

            entries.push(TagEntry { hash, name });
        }

        Ok(Self { entries })
    }

    /// Name listed for `hash`, if the table has it.
    pub fn name_of(&self, hash: u32) -> Option<&str> {
        self.entries.iter().find(|e| e.hash == hash).map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
