use log::debug;

use crate::cursor::Writer;
use crate::error::{Error, Result};
use crate::layout::{u32_field, FileHeader, Tag, CLOSE_PAYLOAD, FILLER, FLAVOR_EXTENDED, FLAVOR_PLAIN, HEADER_SIZE};
use crate::script::Statement;
use crate::string_table::StringBlob;
use crate::tag_table::TagTable;
use crate::value::Value;

/// Encode a statement list into a MAP_ENV container.
///
/// The statements are expected to be balanced (as produced by
/// [`crate::script::parse`]); scope nesting is not re-checked here.
pub fn encode(statements: &[Statement]) -> Result<Vec<u8>> {
    let mut entries = Writer::default();
    let mut strings = StringBlob::new();
    let mut tags: Vec<Tag> = Vec::new();

    for statement in statements {
        let tag = encode_statement(statement, &mut entries, &mut strings)?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    entries.write_u8(0);
    entries.pad_block();
    let entries = entries.into_bytes();

    let string_count = strings.count();
    let strings = strings.finish();
    let tag_table = TagTable::build(&tags);

    let header = FileHeader {
        entry_count: u32_field(statements.len(), "entry count")?,
        string_blob_offset: u32_field(HEADER_SIZE + entries.len(), "entry region")?,
        string_blob_len: u32_field(strings.len(), "string blob")?,
        string_count,
    };
    debug!(
        "encoded {} entries ({} bytes), {} strings ({} bytes), {} tags",
        header.entry_count,
        entries.len(),
        string_count,
        strings.len(),
        tags.len()
    );

    let mut out = Writer::with_capacity(HEADER_SIZE + entries.len() + strings.len() + tag_table.len());
    header.write(&mut out);
    out.write_bytes(&entries);
    out.write_bytes(&strings);
    out.write_bytes(&tag_table);
    Ok(out.into_bytes())
}

/// Append one record and return its tag.
fn encode_statement(statement: &Statement, w: &mut Writer, strings: &mut StringBlob) -> Result<Tag> {
    match statement {
        Statement::TreeOpen { key, is_root_marker } => {
            let key_ref = strings.push(key)?;
            w.write_u32(Tag::Tree.hash());
            if *is_root_marker {
                w.write_u16(FLAVOR_EXTENDED as u16);
                w.write_bytes(&[FILLER, FILLER]);
                w.write_u32(0);
            } else {
                w.write_u16(FLAVOR_PLAIN as u16);
                w.write_bytes(&[FILLER, FILLER]);
            }
            w.write_u32(key_ref.0);
            Ok(Tag::Tree)
        }

        Statement::TreeClose => {
            w.write_u32(Tag::TreeEnd.hash());
            w.write_bytes(&CLOSE_PAYLOAD);
            Ok(Tag::TreeEnd)
        }

        Statement::Scalar { value, label: None } => {
            w.write_u32(Tag::Value.hash());
            w.write_bytes(&[FLAVOR_PLAIN, value.kind() as u8, FILLER, FILLER]);
            value.write_payload(w)?;
            Ok(Tag::Value)
        }

        Statement::Scalar {
            value,
            label: Some(label),
        } => {
            // The label reference follows the payload, so the payload must be fixed width.
            if let Value::String(s) = value {
                return Err(Error::UnsupportedValueType {
                    message: format!("labeled PTVAL needs a numeric value, found string {s:?} (label {label:?})"),
                });
            }
            let label_ref = strings.push(label)?;
            w.write_u32(Tag::Value.hash());
            w.write_bytes(&[FLAVOR_EXTENDED, value.kind() as u8, FILLER, FILLER]);
            value.write_payload(w)?;
            w.write_u32(label_ref.0);
            Ok(Tag::Value)
        }

        Statement::ValueList { values } => {
            let count = u16::try_from(values.len()).map_err(|_| Error::UnsupportedValueType {
                message: format!("PTVALS holds {} values, at most {} fit", values.len(), u16::MAX),
            })?;
            w.write_u32(Tag::Values.hash());
            w.write_u16(count);
            w.write_bytes(&[FILLER, FILLER]);
            for value in values {
                value.write_payload(w)?;
            }
            Ok(Tag::Values)
        }
    }
}
