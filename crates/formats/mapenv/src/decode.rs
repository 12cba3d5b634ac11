use log::debug;

use crate::container::Container;
use crate::cursor::Cursor;
use crate::error::{Error, Location, Result};
use crate::layout::{Tag, ValueKind, FLAVOR_EXTENDED};
use crate::script::{self, Line, Statement};
use crate::string_table::StringRef;
use crate::tag_table::TagTable;
use crate::value::Value;

/// Decompiler settings.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Spaces per nesting level in the emitted script.
    pub indent_width: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

/// Decode a container into script text.
pub fn decompile(data: &[u8], options: &DecodeOptions) -> Result<String> {
    let lines = decode(data)?;
    Ok(script::render(&lines, options.indent_width))
}

/// Decode a container into statements annotated with their depth.
pub fn decode(data: &[u8]) -> Result<Vec<Line>> {
    let container = Container::parse(data)?;
    let header = container.header();
    let strings = container.strings();
    let tags = container.tags();
    debug!(
        "decoding {} entries, string blob at {:#x} ({} bytes), {} tags",
        header.entry_count,
        header.string_blob_offset,
        header.string_blob_len,
        tags.len()
    );

    let entry_count = header.entry_count as usize;
    let mut c = container.entries();
    let mut depth = 0usize;
    let mut lines = Vec::with_capacity(entry_count.min(data.len() / 8));

    for index in 0..entry_count {
        let offset = c.position();
        let hash = c.read_u32()?;
        let descriptor = c.read_descriptor()?;

        match Tag::from_hash(hash) {
            Some(Tag::Tree) => {
                let is_root_marker = descriptor[0] == FLAVOR_EXTENDED;
                if is_root_marker {
                    c.skip(4)?;
                }
                let key = strings.get(StringRef(c.read_u32()?))?;
                lines.push(Line {
                    depth,
                    statement: Statement::TreeOpen { key, is_root_marker },
                });
                depth += 1;
            }

            Some(Tag::Value) => {
                let value = read_number(&mut c, descriptor[1], offset)?;
                let label = if descriptor[0] == FLAVOR_EXTENDED {
                    Some(strings.get(StringRef(c.read_u32()?))?)
                } else {
                    None
                };
                lines.push(Line {
                    depth,
                    statement: Statement::Scalar { value, label },
                });
            }

            Some(Tag::TreeEnd) => {
                depth = depth.checked_sub(1).ok_or_else(|| Error::MalformedTreeNesting {
                    location: Location::Offset(offset),
                    message: "_PTREE record closes no scope".into(),
                })?;
                if index + 1 < entry_count {
                    resync(&mut c, tags)?;
                }
                lines.push(Line {
                    depth,
                    statement: Statement::TreeClose,
                });
            }

            Some(Tag::Values) => {
                debug!(
                    "PTVALS record at {offset:#x} with {} values",
                    u16::from_le_bytes([descriptor[0], descriptor[1]])
                );
                return Err(Error::UnsupportedListRecord { offset });
            }

            None => return Err(Error::UnknownTag { offset, hash }),
        }
    }

    Ok(lines)
}

/// Read a 4-byte `PTVAL` payload of the given descriptor kind.
fn read_number(c: &mut Cursor<'_>, kind: u8, offset: usize) -> Result<Value> {
    match ValueKind::from_u8(kind) {
        Some(ValueKind::Integer) => Ok(Value::Integer(c.read_i32()?)),
        Some(ValueKind::Float) => Ok(Value::Float(c.read_f32()?)),
        None => Err(Error::UnsupportedValueType {
            message: format!("PTVAL at {offset:#x} has value kind {kind}"),
        }),
    }
}

/// Move the cursor to the next word that equals a tag listed in the file.
///
/// A `_PTREE` record does not say how wide the records before it were, so
/// the next record is found by scanning forward in 4-byte steps. Bytes that
/// happen to match a tag hash are taken as a record start.
fn resync(c: &mut Cursor<'_>, tags: &TagTable) -> Result<()> {
    let start = c.position();
    let mut pos = start;
    while let Some(word) = c.peek_u32_at(pos) {
        if let Some(name) = tags.name_of(word) {
            if pos != start {
                debug!("resynchronized from {start:#x} to {name} at {pos:#x}");
            }
            c.seek(pos);
            return Ok(());
        }
        pos += 4;
    }
    Err(Error::ResyncFailure { offset: start })
}
