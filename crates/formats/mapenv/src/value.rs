use std::fmt;

use crate::cursor::Writer;
use crate::encoding;
use crate::error::Result;
use crate::layout::ValueKind;

/// A scalar carried by `PTVAL` / `PTVALS`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i32),
    Float(f32),
    String(String),
}

impl Value {
    /// Type a raw script token: integer, then float, else the text itself.
    ///
    /// Surrounding whitespace does not prevent a numeric parse, but a string
    /// fallback keeps the token untouched.
    pub fn convert(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(v) = trimmed.parse::<i32>() {
            return Value::Integer(v);
        }
        if let Ok(v) = trimmed.parse::<f32>() {
            return Value::Float(v);
        }
        Value::String(raw.to_owned())
    }

    /// Descriptor kind byte. Strings share the integer kind.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Integer(_) | Value::String(_) => ValueKind::Integer,
        }
    }

    /// Write the payload: 4 bytes for numbers, raw Shift_JIS bytes for strings.
    pub fn write_payload(&self, w: &mut Writer) -> Result<()> {
        match self {
            Value::Integer(v) => w.write_i32(*v),
            Value::Float(v) => w.write_f32(*v),
            Value::String(s) => w.write_bytes(&encoding::encode(s)?),
        }
        Ok(())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            // Debug keeps a fractional part or exponent, so the text re-parses as a float.
            Value::Float(v) => write!(f, "{v:?}"),
            Value::String(s) => f.write_str(s),
        }
    }
}
