//! ESF variant detection and per-variant layout properties

use serde::Serialize;
use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use crate::error::{EsfError, EsfResult};
use crate::io::SizeEncoding;

/// ESF dialects, identified by the leading magic number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Variant {
    /// 0xABCD: 8-byte header, classic records, inline strings
    Abcd,
    /// 0xABCE: 16-byte header, classic records, inline strings
    Abce,
    /// 0xABCF: 16-byte header, classic records, string tables
    Abcf,
    /// 0xABCA: 16-byte header, compact records, string tables
    Abca,
    /// 0xABCB: 16-byte header, compact records, inline strings
    Abcb,
    /// 0xABCC: recognized, header layout not understood
    Abcc,
}

impl Variant {
    /// Variant used when a nested payload cannot be identified
    pub const DEFAULT: Self = Self::Abca;

    /// Look up a variant by magic number
    pub const fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            0xABCD => Some(Self::Abcd),
            0xABCE => Some(Self::Abce),
            0xABCF => Some(Self::Abcf),
            0xABCA => Some(Self::Abca),
            0xABCB => Some(Self::Abcb),
            0xABCC => Some(Self::Abcc),
            _ => None,
        }
    }

    /// Identify the variant of an in-memory document
    pub fn sniff(data: &[u8]) -> EsfResult<Self> {
        let bytes: [u8; 4] = data
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or(EsfError::Truncated {
                offset: 0,
                needed: 4,
                available: data.len(),
            })?;
        let magic = u32::from_le_bytes(bytes);
        Self::from_magic(magic).ok_or(EsfError::UnknownMagic(magic))
    }

    /// Magic number written at the start of the stream
    pub const fn magic(self) -> u32 {
        match self {
            Self::Abcd => 0xABCD,
            Self::Abce => 0xABCE,
            Self::Abcf => 0xABCF,
            Self::Abca => 0xABCA,
            Self::Abcb => 0xABCB,
            Self::Abcc => 0xABCC,
        }
    }

    /// Size of the fixed header in bytes
    pub const fn header_size(self) -> usize {
        match self {
            Self::Abcd => 8,
            Self::Abce | Self::Abcf | Self::Abca | Self::Abcb | Self::Abcc => 16,
        }
    }

    /// Byte offset of the node-name table offset field within the header
    pub const fn table_offset_field(self) -> usize {
        match self {
            Self::Abcd => 0x04,
            Self::Abce | Self::Abcf | Self::Abca | Self::Abcb | Self::Abcc => 0x0C,
        }
    }

    /// Whether strings are stored as ids into string tables
    pub const fn uses_string_tables(self) -> bool {
        matches!(self, Self::Abcf | Self::Abca)
    }

    /// Whether records use the compact info-byte layout
    pub const fn is_compact(self) -> bool {
        matches!(self, Self::Abca | Self::Abcb)
    }

    /// How record, array and raw blob lengths are stored
    pub const fn size_encoding(self) -> SizeEncoding {
        if self.is_compact() {
            SizeEncoding::VarInt
        } else {
            SizeEncoding::Absolute
        }
    }

    /// Whether the header carries a timestamp
    pub const fn has_timestamp(self) -> bool {
        self.header_size() == 16
    }

    /// Fail for variants that cannot be read or written
    pub fn ensure_supported(self) -> EsfResult<()> {
        match self {
            Self::Abcc => Err(EsfError::UnsupportedFormat {
                magic: 0xABCC,
                reason: "header layout is not understood; a sample file is needed to map it",
            }),
            Self::Abcd | Self::Abce | Self::Abcf | Self::Abca | Self::Abcb => Ok(()),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.magic())
    }
}

/// Detect the variant of a stream without consuming it
///
/// Reads the magic and restores the original stream position.
pub fn detect_variant<R: Read + Seek>(reader: &mut R) -> EsfResult<Variant> {
    let start_pos = reader.stream_position()?;

    let mut magic_buffer = [0u8; 4];
    let read = reader.read_exact(&mut magic_buffer);

    // Reset reader position before reporting anything
    reader.seek(SeekFrom::Start(start_pos))?;
    read?;

    let magic = u32::from_le_bytes(magic_buffer);
    Variant::from_magic(magic).ok_or(EsfError::UnknownMagic(magic))
}
