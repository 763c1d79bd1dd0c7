//! Parser and builder for ESF tree-structured save and pack files
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Matches tracing call style
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::float_cmp)] // Binary format requirements
#![allow(clippy::derive_partial_eq_without_eq)] // Float-carrying node types
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! ESF is a binary tree format: named records containing typed scalars,
//! arrays, raw blobs, nested records and LZMA-compressed sub-documents.
//! Several dialects exist, identified by a magic number, which differ in
//! header layout, record layout and whether strings are stored inline or
//! as ids into per-document string tables.
//!
//! # Supported Variants
//!
//! | Magic  | Records | Sizes    | Strings       |
//! |--------|---------|----------|---------------|
//! | 0xABCD | classic | absolute | inline        |
//! | 0xABCE | classic | absolute | inline        |
//! | 0xABCF | classic | absolute | string tables |
//! | 0xABCA | compact | varint   | string tables |
//! | 0xABCB | compact | varint   | inline        |
//!
//! 0xABCC is recognized but its header layout is unknown; reading or
//! writing it fails with [`EsfError::UnsupportedFormat`].
//!
//! # Example
//!
//! ```
//! use esf_formats::{EsfFile, RecordNode, Value, ValueNode, Variant};
//!
//! let root = RecordNode::new("A").with_child(ValueNode::int32(42));
//! let file = EsfFile::new(Variant::Abca, root.into());
//! let bytes = file.build()?;
//!
//! let parsed = EsfFile::parse(&bytes)?;
//! let record = parsed.root().as_record().expect("root is a record");
//! assert_eq!(record.values().next(), Some(&Value::I32(42)));
//! # Ok::<(), esf_formats::EsfError>(())
//! ```
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: every node kind decodes exactly the bytes it
//!   encodes
//! - **Stable Ids**: parsed string ids survive re-encoding; only new
//!   values get new ids
//! - **No Seeking Sinks**: documents are assembled in memory and the table
//!   offset is patched before output

pub mod codec;
pub mod compare;
/// LZMA compression for nested documents
pub mod compression;
pub mod compressed;
pub mod error;
pub mod file;
pub mod header;
/// Byte-level reader and writer with variant-specific size encodings
pub mod io;
pub mod node;
/// Node-name and string tables with stable id allocation
pub mod tables;
pub mod types;
pub mod value;
pub mod variant;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use codec::{Codec, CodecOptions, StringTableMode, detect_codec};
pub use compressed::CompressedNode;
pub use error::{EsfError, EsfResult};
pub use file::EsfFile;
pub use header::Header;
pub use io::{EsfReader, EsfWriter, SizeEncoding};
pub use node::{ArrayNode, Node, RawNode, RecordBlockNode, RecordNode, ValueNode};
pub use tables::{NodeNameTable, StringTable, StringTables};
pub use types::{TypeCode, ValueKind};
pub use value::{Coord2d, Coord3d, Type26, Value};
pub use variant::{Variant, detect_variant};

/// Common format trait for parse/build pairs
pub trait EsfFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("Round-trip verification failed".into());
        }
        Ok(())
    }
}
