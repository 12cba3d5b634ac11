//! Reader/writer for MAP_ENV environment containers and their text script form.
//!
//! Three-layer architecture:
//! - **Layer 1** (`cursor`/`layout`/`container`): byte primitives, fixed
//!   layout constants, region index (header, string blob, tag table)
//! - **Layer 2** (`script`): text script ⇄ [`Statement`] list
//! - **Layer 3** (`encode`/`decode`): statements ⇄ container bytes

pub mod container;
pub mod cursor;
pub mod decode;
pub mod encode;
pub mod encoding;
pub mod error;
pub mod layout;
pub mod script;
pub mod string_table;
pub mod tag_table;
pub mod value;

pub use container::Container;
pub use decode::DecodeOptions;
pub use error::{Error, Location, Result};
pub use script::{Line, Statement};
pub use value::Value;

/// Compile script text into a container.
pub fn compile(text: &str) -> Result<Vec<u8>> {
    let statements = script::parse(text)?;
    encode::encode(&statements)
}

/// Compile a Shift_JIS encoded script file.
pub fn compile_bytes(raw: &[u8]) -> Result<Vec<u8>> {
    compile(&encoding::decode(raw, 0)?)
}

/// Decompile a container into script text with default options.
pub fn decompile(data: &[u8]) -> Result<String> {
    decode::decompile(data, &DecodeOptions::default())
}

/// Decompile a container with explicit options.
pub fn decompile_with(data: &[u8], options: &DecodeOptions) -> Result<String> {
    decode::decompile(data, options)
}

/// Decompile a container into Shift_JIS encoded script bytes.
pub fn decompile_to_bytes(data: &[u8], options: &DecodeOptions) -> Result<Vec<u8>> {
    let text = decode::decompile(data, options)?;
    Ok(encoding::encode(&text)?.into_owned())
}
