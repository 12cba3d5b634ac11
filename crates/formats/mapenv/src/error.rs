use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported value type: {message}")]
    UnsupportedValueType { message: String },

    #[error("malformed tree nesting at {location}: {message}")]
    MalformedTreeNesting {
        location: Location,
        message: String,
    },

    #[error("truncated record at offset {offset:#x} (need {need} bytes, have {have})")]
    TruncatedBinaryRecord {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("string offset {offset:#x} does not resolve inside the string blob ({blob_len} bytes)")]
    UnresolvedStringOffset { offset: usize, blob_len: usize },

    #[error("no known tag hash found between offset {offset:#x} and end of data")]
    ResyncFailure { offset: usize },

    #[error("unknown tag hash {hash:#010x} at offset {offset:#x}")]
    UnknownTag { offset: usize, hash: u32 },

    #[error("PTVALS record at offset {offset:#x} cannot be decoded: element types are not stored")]
    UnsupportedListRecord { offset: usize },

    #[error("text cannot be represented in Shift_JIS: {text:?}")]
    Unencodable { text: String },

    #[error("invalid Shift_JIS text at offset {offset:#x}")]
    InvalidText { offset: usize },

    #[error("invalid header: {message}")]
    InvalidHeader { message: String },

    #[error("{what} ({size}) does not fit a 32-bit header field")]
    TooLarge { what: &'static str, size: usize },
}

/// Where a nesting error was detected: a script line or a binary offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Line(usize),
    EndOfInput,
    Offset(usize),
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Line(n) => write!(f, "line {n}"),
            Location::EndOfInput => write!(f, "end of input"),
            Location::Offset(o) => write!(f, "offset {o:#x}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
