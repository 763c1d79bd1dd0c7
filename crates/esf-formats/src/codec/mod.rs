//! Variant codecs
//!
//! A [`Codec`] holds everything about a document that is not the node tree:
//! its header, node-name table, string tables and options. One codec type
//! covers every variant; per-variant behavior (header layout, record
//! layout, size encoding, string storage) is looked up on [`Variant`].
//!
//! # Parsing
//!
//! 1. Read the header (refusing unsupported variants)
//! 2. Check that the table offset lies inside the stream, past the header
//! 3. Read the node-name table and, for table-indexed variants, the UTF-16
//!    and ASCII string tables that follow it
//! 4. Decode the record tree between the header and the table offset
//!
//! # Encoding
//!
//! Encoding works on a copy of the tables, so the codec is left untouched
//! and repeated encodes produce identical bytes. The whole document is
//! assembled in memory and the table offset is patched into the header
//! before anything is returned, so output sinks never need to seek.

mod decoder;
mod encoder;
mod options;

pub use options::{
    CodecOptions, DEFAULT_MAX_DECOMPRESSED_SIZE, DEFAULT_MAX_DEPTH, StringTableMode,
};

use serde::Serialize;
use tracing::debug;

use crate::error::{EsfError, EsfResult};
use crate::header::Header;
use crate::io::{EsfReader, EsfWriter, to_u32};
use crate::node::Node;
use crate::tables::{NodeNameTable, StringTables};
use crate::variant::Variant;
use decoder::Decoder;
use encoder::Encoder;

/// Header, tables and options of one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Codec {
    header: Header,
    names: NodeNameTable,
    strings: StringTables,
    #[serde(skip)]
    options: CodecOptions,
}

impl Codec {
    /// Codec for a new document with empty tables
    pub fn new(variant: Variant) -> Self {
        Self {
            header: Header::new(variant),
            names: NodeNameTable::new(),
            strings: StringTables::default(),
            options: CodecOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a document, detecting its variant from the magic
    pub fn parse(data: &[u8]) -> EsfResult<(Self, Node)> {
        Self::parse_with_options(data, CodecOptions::default())
    }

    /// Parse a document with explicit options
    pub fn parse_with_options(data: &[u8], options: CodecOptions) -> EsfResult<(Self, Node)> {
        Self::parse_as(Variant::sniff(data)?, data, options)
    }

    /// Parse a document with the layout of `variant`, ignoring its magic
    pub fn parse_as(
        variant: Variant,
        data: &[u8],
        options: CodecOptions,
    ) -> EsfResult<(Self, Node)> {
        let header = Header::parse_as(variant, data)?;
        let table_offset = header.table_offset as usize;
        if table_offset < variant.header_size() || table_offset >= data.len() {
            return Err(EsfError::InvalidTableOffset {
                offset: header.table_offset,
                stream_len: data.len(),
            });
        }

        let mut reader = EsfReader::new(data);
        reader.seek(table_offset)?;
        let names = NodeNameTable::read(&mut reader)?;
        let strings = if variant.uses_string_tables() {
            StringTables::read(&mut reader)?
        } else {
            StringTables::default()
        };
        debug!(
            "Parsed {} header: {} node names, {} UTF-16 and {} ASCII strings",
            variant,
            names.len(),
            strings.utf16.len(),
            strings.ascii.len()
        );

        // The record tree ends where the tables begin
        let mut body = EsfReader::new(&data[..table_offset]);
        body.seek(variant.header_size())?;
        let mut decoder = Decoder {
            variant,
            names: &names,
            strings: &strings,
            options: &options,
            depth: 0,
        };
        let root = decoder.read_node(&mut body)?;
        if body.remaining() != 0 {
            return Err(EsfError::NodeOverrun {
                start: variant.header_size(),
                end: table_offset,
                reached: body.position(),
            });
        }

        let codec = Self {
            header,
            names,
            strings,
            options,
        };
        Ok((codec, root))
    }

    /// Encode `root` as a complete document
    pub fn encode_root(&self, root: &Node) -> EsfResult<Vec<u8>> {
        let variant = self.variant();
        variant.ensure_supported()?;

        let (mut names, mut strings) = match self.options.string_tables {
            StringTableMode::Preserve => (self.names.clone(), self.strings.clone()),
            StringTableMode::Reset => (NodeNameTable::new(), StringTables::default()),
        };
        let mut header = self.header;
        header.table_offset = 0;
        if self.options.stamp_edit_time {
            header.stamp_now();
        }

        let mut writer = EsfWriter::new();
        writer.write_bytes(&header.to_bytes()?);
        if writer.position() != variant.header_size() {
            return Err(EsfError::HeaderSizeMismatch {
                expected: variant.header_size(),
                actual: writer.position(),
            });
        }

        Encoder {
            variant,
            names: &mut names,
            strings: &mut strings,
        }
        .write_node(root, &mut writer)?;

        let table_offset = to_u32(writer.position(), "table offset")?;
        names.write(&mut writer)?;
        if variant.uses_string_tables() {
            strings.write(&mut writer)?;
        }
        writer.patch_u32(variant.table_offset_field(), table_offset)?;

        debug!(
            "Encoded {} document: {} bytes, tables at 0x{:X}",
            variant,
            writer.position(),
            table_offset
        );
        Ok(writer.into_inner())
    }

    pub fn variant(&self) -> Variant {
        self.header.variant
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn node_names(&self) -> &NodeNameTable {
        &self.names
    }

    pub fn string_tables(&self) -> &StringTables {
        &self.strings
    }

    /// Tables for explicit id assignment before an encode
    pub fn string_tables_mut(&mut self) -> &mut StringTables {
        &mut self.strings
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut CodecOptions {
        &mut self.options
    }
}

/// Detect the variant of an in-memory document and return a fresh codec
pub fn detect_codec(data: &[u8]) -> EsfResult<Codec> {
    let variant = Variant::sniff(data)?;
    variant.ensure_supported()?;
    Ok(Codec::new(variant))
}
