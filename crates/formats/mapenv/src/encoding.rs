//! Shift_JIS conversion. Script files and every string in the container use it.

use std::borrow::Cow;

use encoding_rs::SHIFT_JIS;

use crate::error::{Error, Result};

/// Encode text to Shift_JIS, failing on characters it cannot represent.
pub fn encode(text: &str) -> Result<Cow<'_, [u8]>> {
    let (bytes, _, had_errors) = SHIFT_JIS.encode(text);
    if had_errors {
        return Err(Error::Unencodable {
            text: text.to_owned(),
        });
    }
    Ok(bytes)
}

/// Decode Shift_JIS bytes. `offset` is only used for error reporting.
pub fn decode(bytes: &[u8], offset: usize) -> Result<String> {
    SHIFT_JIS
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or(Error::InvalidText { offset })
}
