use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::layout::{FileHeader, HEADER_SIZE};
use crate::string_table::StringTable;
use crate::tag_table::TagTable;

/// Region index of a MAP_ENV file.
///
/// Only knows where the entry records, string blob and tag table live.
/// Walking the records is left to [`crate::decode`].
pub struct Container<'a> {
    data: &'a [u8],
    header: FileHeader,
    tags: TagTable,
}

impl<'a> Container<'a> {
    /// Parse the header and tag table and check that the regions fit.
    ///
    /// The `data` slice must be the entire file contents.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let header = FileHeader::parse(&mut cursor)?;

        let blob_start = header.string_blob_offset as usize;
        let blob_end = header.tag_table_offset();
        if blob_start < HEADER_SIZE {
            return Err(Error::InvalidHeader {
                message: format!("string blob offset {blob_start:#x} overlaps the header"),
            });
        }
        if blob_end > data.len() {
            return Err(Error::TruncatedBinaryRecord {
                offset: blob_start,
                need: header.string_blob_len as usize,
                have: data.len().saturating_sub(blob_start),
            });
        }

        let tags = TagTable::parse(data, blob_end)?;
        Ok(Self { data, header, tags })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    /// Cursor positioned at the first entry record.
    pub fn entries(&self) -> Cursor<'a> {
        Cursor::new(self.data).at_offset(HEADER_SIZE)
    }

    /// The string blob.
    pub fn strings(&self) -> StringTable<'a> {
        let start = self.header.string_blob_offset as usize;
        let end = self.header.tag_table_offset();
        StringTable::new(&self.data[start..end], start)
    }
}
