use crate::cursor::Writer;
use crate::encoding;
use crate::error::{Error, Result};
use crate::layout::{u32_field, ROOT_MARKER};

/// Offset of a string relative to the start of the string blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef(pub u32);

/// Write side of the string blob.
///
/// Starts with the `MAP_ENV` seed. Strings are appended as they are met and
/// never deduplicated, so offsets are stable as soon as they are handed out.
pub struct StringBlob {
    w: Writer,
    count: u32,
}

impl StringBlob {
    pub fn new() -> Self {
        let mut w = Writer::default();
        w.write_bytes(ROOT_MARKER.as_bytes());
        w.write_u8(0);
        Self { w, count: 1 }
    }

    /// Append a NUL-terminated string and return where it starts.
    pub fn push(&mut self, text: &str) -> Result<StringRef> {
        let offset = StringRef(u32_field(self.w.position(), "string blob")?);
        self.w.write_bytes(&encoding::encode(text)?);
        self.w.write_u8(0);
        self.count += 1;
        Ok(offset)
    }

    /// Number of strings, seed included.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Terminate and pad the blob.
    pub fn finish(mut self) -> Vec<u8> {
        self.w.write_u8(0);
        self.w.pad_block();
        self.w.into_bytes()
    }
}

impl Default for StringBlob {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the string blob.
#[derive(Clone, Copy)]
pub struct StringTable<'a> {
    /// Blob bytes, padding included.
    data: &'a [u8],
    /// Absolute offset of the blob, for error messages.
    base: usize,
}

impl<'a> StringTable<'a> {
    pub fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, base }
    }

    /// Resolve a reference to the string ending at the next NUL.
    pub fn get(&self, sref: StringRef) -> Result<String> {
        let start = sref.0 as usize;
        let unresolved = || Error::UnresolvedStringOffset {
            offset: start,
            blob_len: self.data.len(),
        };
        let tail = self.data.get(start..).ok_or_else(unresolved)?;
        let len = tail.iter().position(|&b| b == 0).ok_or_else(unresolved)?;
        encoding::decode(&tail[..len], self.base + start)
    }
}
