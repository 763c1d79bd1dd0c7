//! Fixed-size ESF headers
//!
//! Two layouts exist. 0xABCD uses an 8-byte header holding the magic and the
//! node-name table offset. Every later variant uses 16 bytes:
//!
//! ```text
//! 0x00  magic         u32
//! 0x04  unknown       u32
//! 0x08  timestamp     u32  unix seconds of the last edit
//! 0x0C  table_offset  u32  start of the node-name table
//! ```

use binrw::{BinRead, BinWrite, io::Cursor};
use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{EsfError, EsfResult};
use crate::variant::Variant;

/// 8-byte header of 0xABCD documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
struct ShortHeader {
    magic: u32,
    table_offset: u32,
}

/// 16-byte header of every later variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
struct ExtendedHeader {
    magic: u32,
    unknown: u32,
    timestamp: u32,
    table_offset: u32,
}

/// Parsed header of any supported variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Variant selected by the magic
    pub variant: Variant,
    /// Second header word; meaning unknown, preserved as read
    pub unknown: u32,
    /// Unix timestamp of the last edit (0 for 0xABCD)
    pub timestamp: u32,
    /// Offset of the node-name table
    pub table_offset: u32,
}

impl Header {
    /// Fresh header for a new document, stamped with the current time
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            unknown: 0,
            timestamp: if variant.has_timestamp() { now_secs() } else { 0 },
            table_offset: 0,
        }
    }

    /// Parse the header at the start of `data`
    ///
    /// Refuses unsupported variants before looking past the magic.
    pub fn parse(data: &[u8]) -> EsfResult<Self> {
        Self::parse_as(Variant::sniff(data)?, data)
    }

    /// Parse a header with the layout of `variant`, whatever its magic says
    pub fn parse_as(variant: Variant, data: &[u8]) -> EsfResult<Self> {
        variant.ensure_supported()?;

        let size = variant.header_size();
        if data.len() < size {
            return Err(EsfError::Truncated {
                offset: 0,
                needed: size,
                available: data.len(),
            });
        }

        let mut cursor = Cursor::new(&data[..size]);
        Ok(if variant.has_timestamp() {
            let raw = ExtendedHeader::read(&mut cursor)?;
            Self {
                variant,
                unknown: raw.unknown,
                timestamp: raw.timestamp,
                table_offset: raw.table_offset,
            }
        } else {
            let raw = ShortHeader::read(&mut cursor)?;
            Self {
                variant,
                unknown: 0,
                timestamp: 0,
                table_offset: raw.table_offset,
            }
        })
    }

    /// Serialize the header, exactly `variant.header_size()` bytes
    pub fn to_bytes(&self) -> EsfResult<Vec<u8>> {
        self.variant.ensure_supported()?;

        let mut buffer = Vec::with_capacity(self.variant.header_size());
        let mut cursor = Cursor::new(&mut buffer);
        let magic = self.variant.magic();
        if self.variant.has_timestamp() {
            ExtendedHeader {
                magic,
                unknown: self.unknown,
                timestamp: self.timestamp,
                table_offset: self.table_offset,
            }
            .write(&mut cursor)?;
        } else {
            ShortHeader {
                magic,
                table_offset: self.table_offset,
            }
            .write(&mut cursor)?;
        }
        Ok(buffer)
    }

    /// Time of the last edit, for variants that record one
    pub fn edit_time(&self) -> Option<SystemTime> {
        self.variant
            .has_timestamp()
            .then(|| UNIX_EPOCH + Duration::from_secs(u64::from(self.timestamp)))
    }

    /// Set the edit timestamp to the current time
    pub fn stamp_now(&mut self) {
        if self.variant.has_timestamp() {
            self.timestamp = now_secs();
        }
    }
}

fn now_secs() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
}
