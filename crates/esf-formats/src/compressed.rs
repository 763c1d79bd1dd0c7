//! Compressed sub-documents
//!
//! A record named `COMPRESSED_DATA` carries a complete ESF document,
//! LZMA-compressed:
//!
//! ```text
//! COMPRESSED_DATA
//! ├── raw: compressed stream
//! └── COMPRESSED_DATA_INFO
//!     ├── u32: uncompressed size
//!     └── raw: 5-byte LZMA properties
//! ```
//!
//! On decode the payload is decompressed and parsed with its own codec,
//! which may be a different variant than the enclosing document. On encode
//! the nested document is rebuilt with that codec and compressed again.

use serde::Serialize;
use tracing::{debug, warn};

use crate::codec::{Codec, CodecOptions};
use crate::compression::{PROPERTIES_LEN, compress_document, decompress_document};
use crate::error::{EsfError, EsfResult};
use crate::file::EsfFile;
use crate::io::to_u32;
use crate::node::{Node, RawNode, RecordNode, ValueNode};
use crate::types::TypeCode;
use crate::value::Value;
use crate::variant::Variant;

/// Decoded compressed sub-document
#[derive(Debug, Clone, Serialize)]
pub struct CompressedNode {
    document: Box<EsfFile>,
    version: u8,
    info_version: u8,
    size_code: TypeCode,
}

impl CompressedNode {
    /// Record name of the wrapper
    pub const NAME: &'static str = "COMPRESSED_DATA";
    /// Record name of the size/properties record
    pub const INFO_NAME: &'static str = "COMPRESSED_DATA_INFO";

    /// Wrap a document for compressed storage
    pub fn new(document: EsfFile) -> Self {
        Self {
            document: Box::new(document),
            version: 0,
            info_version: 0,
            size_code: TypeCode::UINT32,
        }
    }

    pub fn document(&self) -> &EsfFile {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut EsfFile {
        &mut self.document
    }

    /// Version of the `COMPRESSED_DATA` wrapper record
    pub fn version(&self) -> u8 {
        self.version
    }

    /// The nested tree
    pub fn root(&self) -> &Node {
        self.document.root()
    }

    /// Decode a `COMPRESSED_DATA` record into a nested document
    ///
    /// Records without the expected shape are returned unchanged.
    pub(crate) fn expand(record: RecordNode, options: &CodecOptions) -> EsfResult<Node> {
        let Some(parts) = Parts::of(&record) else {
            warn!(
                "{} record does not have the compressed layout; keeping it as a plain record",
                Self::NAME
            );
            return Ok(Node::Record(record));
        };

        let size = parts.size as usize;
        let bytes = decompress_document(
            parts.properties,
            parts.data,
            size,
            options.max_decompressed_size,
        )?;

        let variant = match Variant::sniff(&bytes) {
            Ok(variant) => variant,
            Err(EsfError::UnknownMagic(magic)) => {
                warn!(
                    "Compressed payload has unknown magic 0x{:08X}, reading it as {}",
                    magic,
                    Variant::DEFAULT
                );
                Variant::DEFAULT
            }
            Err(e) => return Err(e),
        };
        debug!(
            "Expanding {} payload: {} -> {} bytes",
            variant,
            parts.data.len(),
            size
        );

        let (codec, root) = Codec::parse_as(variant, &bytes, options.clone())?;
        Ok(Node::Compressed(Self {
            document: Box::new(EsfFile::from_parts(codec, root)),
            version: record.version,
            info_version: parts.info_version,
            size_code: parts.size_code,
        }))
    }

    /// Rebuild the nested document and compress it into record form
    pub fn to_record(&self) -> EsfResult<RecordNode> {
        let bytes = self.document.build()?;
        let (properties, data) = compress_document(&bytes)?;
        let size = to_u32(bytes.len(), "uncompressed size")?;
        let size = ValueNode::new(self.size_code, Value::U32(size))?;

        let info = RecordNode::new(Self::INFO_NAME)
            .with_version(self.info_version)
            .with_child(size)
            .with_child(RawNode::new(properties));
        Ok(RecordNode::new(Self::NAME)
            .with_version(self.version)
            .with_child(RawNode::new(data))
            .with_child(info))
    }
}

impl PartialEq for CompressedNode {
    /// Structural equality of the nested documents
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

/// Borrowed pieces of a `COMPRESSED_DATA` record
struct Parts<'a> {
    data: &'a [u8],
    size: u32,
    size_code: TypeCode,
    properties: &'a [u8],
    info_version: u8,
}

impl<'a> Parts<'a> {
    fn of(record: &'a RecordNode) -> Option<Self> {
        let [Node::Raw(data), Node::Record(info)] = record.children.as_slice() else {
            return None;
        };
        if info.name != CompressedNode::INFO_NAME {
            return None;
        }
        let [Node::Value(size), Node::Raw(properties)] = info.children.as_slice() else {
            return None;
        };
        let Value::U32(size_value) = size.value() else {
            return None;
        };
        if properties.data.len() != PROPERTIES_LEN {
            return None;
        }
        Some(Self {
            data: &data.data,
            size: *size_value,
            size_code: size.code(),
            properties: &properties.data,
            info_version: info.version,
        })
    }
}
