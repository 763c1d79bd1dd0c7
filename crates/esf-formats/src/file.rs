//! Whole ESF documents

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::EsfFormat;
use crate::codec::{Codec, CodecOptions};
use crate::error::EsfResult;
use crate::node::Node;
use crate::variant::Variant;

/// A parsed document: its codec and its root node
#[derive(Debug, Clone, Serialize)]
pub struct EsfFile {
    codec: Codec,
    root: Node,
}

impl EsfFile {
    /// New document of `variant` with empty tables
    pub fn new(variant: Variant, root: Node) -> Self {
        Self::from_parts(Codec::new(variant), root)
    }

    pub fn from_parts(codec: Codec, root: Node) -> Self {
        Self { codec, root }
    }

    pub fn into_parts(self) -> (Codec, Node) {
        (self.codec, self.root)
    }

    /// Parse a document with default options
    pub fn parse(data: &[u8]) -> EsfResult<Self> {
        Self::parse_with_options(data, CodecOptions::default())
    }

    pub fn parse_with_options(data: &[u8], options: CodecOptions) -> EsfResult<Self> {
        let (codec, root) = Codec::parse_with_options(data, options)?;
        Ok(Self { codec, root })
    }

    /// Encode the document with its own codec
    pub fn build(&self) -> EsfResult<Vec<u8>> {
        self.codec.encode_root(&self.root)
    }

    /// Read and parse a file
    pub fn load(path: impl AsRef<Path>) -> EsfResult<Self> {
        Self::load_with_options(path, CodecOptions::default())
    }

    pub fn load_with_options(path: impl AsRef<Path>, options: CodecOptions) -> EsfResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        debug!("Loading {} ({} bytes)", path.display(), data.len());
        Self::parse_with_options(&data, options)
    }

    /// Encode and write to `path`
    ///
    /// Nothing is written if encoding fails.
    pub fn save(&self, path: impl AsRef<Path>) -> EsfResult<()> {
        let path = path.as_ref();
        let data = self.build()?;
        std::fs::write(path, &data)?;
        info!("Wrote {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    /// Encode and write to any sink
    pub fn write_to<W: Write>(&self, writer: &mut W) -> EsfResult<()> {
        let data = self.build()?;
        writer.write_all(&data)?;
        Ok(())
    }

    pub fn variant(&self) -> Variant {
        self.codec.variant()
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn codec_mut(&mut self) -> &mut Codec {
        &mut self.codec
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }
}

impl PartialEq for EsfFile {
    /// Documents are equal when their variant and tree are; tables and
    /// header fields are not compared
    fn eq(&self, other: &Self) -> bool {
        self.variant() == other.variant() && self.root == other.root
    }
}

impl EsfFormat for EsfFile {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::parse(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(Self::build(self)?)
    }
}
