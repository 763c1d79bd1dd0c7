//! ESF error types

use thiserror::Error;

/// ESF-specific error type
#[derive(Debug, Error)]
pub enum EsfError {
    /// A read ran past the end of the stream
    #[error("truncated stream at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Offset the read started at
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the stream
        available: usize,
    },

    /// A declared length or end offset does not fit the stream
    #[error("invalid length at offset {offset}: declared {declared}, {available} bytes available")]
    InvalidLength {
        /// Offset of the length field
        offset: usize,
        /// Declared length (or end offset for absolute sizes)
        declared: u64,
        /// Bytes left in the stream
        available: usize,
    },

    /// Variable-length integer is longer than five bytes or overflows u32
    #[error("variable-length integer overflow at offset {0}")]
    VarIntOverflow(usize),

    /// Magic number does not belong to any known variant
    #[error("unknown ESF magic: 0x{0:08X}")]
    UnknownMagic(u32),

    /// Magic is known but the variant cannot be read or written
    #[error("unsupported ESF format 0x{magic:04X}: {reason}")]
    UnsupportedFormat {
        /// Magic number of the refused variant
        magic: u32,
        /// What is missing before the variant can be supported
        reason: &'static str,
    },

    /// Node-name table offset in the header points outside the stream
    #[error("invalid node-name table offset 0x{offset:X} for a {stream_len}-byte stream")]
    InvalidTableOffset {
        /// Offset from the header
        offset: u32,
        /// Total stream length
        stream_len: usize,
    },

    /// Header writer produced a different size than the variant declares
    #[error("header size mismatch: expected {expected} bytes, wrote {actual}")]
    HeaderSizeMismatch {
        /// Size the variant declares
        expected: usize,
        /// Size actually written
        actual: usize,
    },

    /// Type code byte has no node kind
    #[error("unknown type code 0x{code:02X} at offset {offset}")]
    UnknownTypeCode {
        /// The type code byte
        code: u8,
        /// Offset of the type code
        offset: usize,
    },

    /// Array type code whose element has no payload width
    #[error("invalid array element type 0x{code:02X} at offset {offset}")]
    InvalidArrayElement {
        /// Array type code
        code: u8,
        /// Offset of the type code
        offset: usize,
    },

    /// Children of a sized node did not stop exactly at its declared end
    #[error("node at offset {start} does not end at its declared end {end} (reached {reached})")]
    NodeOverrun {
        /// Offset where the sized payload starts
        start: usize,
        /// Declared end offset
        end: usize,
        /// Position reached by the decoder
        reached: usize,
    },

    /// Records nest deeper than the decoder allows
    #[error("record at offset {offset} nests deeper than {limit} levels")]
    NestingTooDeep {
        /// Offset of the record header
        offset: usize,
        /// Configured depth limit
        limit: usize,
    },

    /// Record refers to a name index outside the node-name table
    #[error("unknown node name index {index} at offset {offset}")]
    UnknownNodeName {
        /// Name index
        index: u16,
        /// Offset of the record header
        offset: usize,
    },

    /// String id does not resolve through the string table
    #[error("unknown string id {id} at offset {offset}")]
    UnknownStringId {
        /// String id read from the stream
        id: u32,
        /// Offset of the id
        offset: usize,
    },

    /// String bytes cannot be represented
    #[error("invalid string at offset {offset}: {reason}")]
    InvalidString {
        /// Offset of the string data
        offset: usize,
        /// What was wrong
        reason: String,
    },

    /// Record name is empty
    #[error("record name must not be empty")]
    EmptyName,

    /// Node-name table is full
    #[error("too many node names: {0} (limit 65535)")]
    TooManyNames(usize),

    /// Value kind does not match the node's type code
    #[error("type mismatch: code {code} cannot hold a {found} value")]
    TypeMismatch {
        /// Type code name
        code: String,
        /// Kind of value found
        found: &'static str,
    },

    /// Value does not fit the field it is written to
    #[error("value out of range for {field}: {value}")]
    ValueOutOfRange {
        /// Field being written
        field: &'static str,
        /// Offending value
        value: u64,
    },

    /// Text could not be converted to a value
    #[error("cannot parse {text:?} as {kind}")]
    InvalidText {
        /// Target value kind
        kind: &'static str,
        /// Input text
        text: String,
    },

    /// LZMA compression failed
    #[error("compression failed: {0}")]
    Compression(String),

    /// LZMA decompression failed
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Nested payload declares more data than allowed
    #[error("decompressed size {size} exceeds limit of {limit} bytes")]
    DecompressionLimit {
        /// Declared uncompressed size
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// Decompressor produced a different size than declared
    #[error("decompressed size mismatch: expected {expected}, got {actual}")]
    DecompressedSizeMismatch {
        /// Size declared in the info record
        expected: usize,
        /// Size produced
        actual: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for ESF operations
pub type EsfResult<T> = Result<T, EsfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = EsfError::Truncated {
            offset: 12,
            needed: 4,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "truncated stream at offset 12: needed 4 bytes, 1 available"
        );

        let err = EsfError::UnsupportedFormat {
            magic: 0xABCC,
            reason: "header layout unknown",
        };
        assert!(err.to_string().contains("0xABCC"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: EsfError = io.into();
        assert!(matches!(err, EsfError::Io(_)));
    }
}
