//! Primitive reads and writes shared by every ESF variant
//!
//! [`EsfReader`] walks a borrowed byte slice and reports the exact offset of
//! any truncation. [`EsfWriter`] appends to an in-memory buffer; patching
//! placeholders happens on the buffer, so output sinks never need to seek.

use crate::error::{EsfError, EsfResult};

/// Maximum number of bytes in an encoded variable-length size
const MAX_VARINT_BYTES: usize = 5;

/// How a variant stores byte lengths of records, arrays and raw blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeEncoding {
    /// u32 absolute end position in the stream
    Absolute,
    /// Variable-length byte count, most significant 7-bit group first
    VarInt,
}

impl SizeEncoding {
    /// Read a length and check that it fits the remaining stream
    pub fn read_size(self, reader: &mut EsfReader<'_>) -> EsfResult<usize> {
        let field_offset = reader.position();
        let length = match self {
            Self::Absolute => {
                let end = reader.read_u32()? as usize;
                if end < reader.position() {
                    return Err(EsfError::InvalidLength {
                        offset: field_offset,
                        declared: end as u64,
                        available: reader.remaining(),
                    });
                }
                end - reader.position()
            }
            Self::VarInt => reader.read_varint()? as usize,
        };

        if length > reader.remaining() {
            return Err(EsfError::InvalidLength {
                offset: field_offset,
                declared: length as u64,
                available: reader.remaining(),
            });
        }
        Ok(length)
    }

    /// Write a length for a payload that follows immediately
    pub fn write_size(self, writer: &mut EsfWriter, length: usize) -> EsfResult<()> {
        match self {
            Self::Absolute => {
                let end = writer.position() + 4 + length;
                writer.write_offset(end)
            }
            Self::VarInt => writer.write_varint(to_u32(length, "size")?),
        }
    }
}

/// Convert a length or offset to the u32 the wire format stores
pub(crate) fn to_u32(value: usize, field: &'static str) -> EsfResult<u32> {
    u32::try_from(value).map_err(|_| EsfError::ValueOutOfRange {
        field,
        value: value as u64,
    })
}

/// Cursor over a borrowed ESF byte stream
#[derive(Debug, Clone)]
pub struct EsfReader<'a> {
    data: &'a [u8],
    pos: usize,
    /// Peeks never look at or past this position
    limit: usize,
}

impl<'a> EsfReader<'a> {
    /// Create a reader positioned at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            limit: data.len(),
        }
    }

    /// Current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total stream length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the stream is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Move to an absolute position (the end of the stream is allowed)
    pub fn seek(&mut self, pos: usize) -> EsfResult<()> {
        if pos > self.data.len() {
            return Err(EsfError::InvalidLength {
                offset: self.pos,
                declared: pos as u64,
                available: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Read `count` raw bytes
    pub fn read_bytes(&mut self, count: usize) -> EsfResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(EsfError::Truncated {
                offset: self.pos,
                needed: count,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> EsfResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Look at the next byte without consuming it
    ///
    /// Returns `None` at the end of the stream and at the end of the
    /// innermost [`Self::bounded`] region.
    pub fn peek_u8(&self) -> Option<u8> {
        if self.pos >= self.limit {
            return None;
        }
        self.data.get(self.pos).copied()
    }

    /// Run `read` with peeks confined to positions before `end`
    ///
    /// Regions nest; an inner region never extends an outer one.
    pub fn bounded<T, F>(&mut self, end: usize, read: F) -> EsfResult<T>
    where
        F: FnOnce(&mut Self) -> EsfResult<T>,
    {
        let outer = self.limit;
        self.limit = end.min(outer);
        let result = read(self);
        self.limit = outer;
        result
    }

    pub fn read_u8(&mut self) -> EsfResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> EsfResult<i8> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> EsfResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> EsfResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    /// Read a 24-bit little-endian unsigned integer
    pub fn read_u24(&mut self) -> EsfResult<u32> {
        let [a, b, c] = self.read_array::<3>()?;
        Ok(u32::from_le_bytes([a, b, c, 0]))
    }

    /// Read a 24-bit little-endian integer, sign-extended
    pub fn read_i24(&mut self) -> EsfResult<i32> {
        let raw = self.read_u24()?;
        Ok(((raw << 8) as i32) >> 8)
    }

    pub fn read_u32(&mut self) -> EsfResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> EsfResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> EsfResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> EsfResult<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> EsfResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f64(&mut self) -> EsfResult<f64> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Read a variable-length integer (7-bit groups, high bit continues)
    pub fn read_varint(&mut self) -> EsfResult<u32> {
        let start = self.pos;
        let mut result = 0u64;

        for _ in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            result = (result << 7) | u64::from(byte & 0x7F);
            if byte & 0x80 == 0 {
                return u32::try_from(result).map_err(|_| EsfError::VarIntOverflow(start));
            }
        }

        Err(EsfError::VarIntOverflow(start))
    }

    /// Read `chars` single-byte characters
    pub fn read_ascii(&mut self, chars: usize) -> EsfResult<String> {
        let bytes = self.read_bytes(chars)?;
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    }

    /// Read `chars` UTF-16 code units
    pub fn read_utf16(&mut self, chars: usize) -> EsfResult<String> {
        let offset = self.pos;
        let byte_len = chars.checked_mul(2).ok_or(EsfError::InvalidLength {
            offset,
            declared: chars as u64,
            available: self.remaining(),
        })?;
        let bytes = self.read_bytes(byte_len)?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|e| EsfError::InvalidString {
            offset,
            reason: e.to_string(),
        })
    }

    /// Read an ASCII string with a u16 character count prefix
    pub fn read_ascii_prefixed(&mut self) -> EsfResult<String> {
        let chars = self.read_u16()? as usize;
        self.read_ascii(chars)
    }

    /// Read a UTF-16 string with a u16 character count prefix
    pub fn read_utf16_prefixed(&mut self) -> EsfResult<String> {
        let chars = self.read_u16()? as usize;
        self.read_utf16(chars)
    }
}

/// Append-only ESF output buffer with placeholder patching
#[derive(Debug, Clone, Default)]
pub struct EsfWriter {
    buf: Vec<u8>,
}

impl EsfWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position (bytes written so far)
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return its buffer
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write the low 24 bits of `value`
    pub fn write_u24(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes()[..3]);
    }

    /// Write the low 24 bits of a sign-extended `value`
    pub fn write_i24(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes()[..3]);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Write an absolute stream position
    pub fn write_offset(&mut self, offset: usize) -> EsfResult<()> {
        self.write_u32(to_u32(offset, "offset")?);
        Ok(())
    }

    /// Write a variable-length integer, most significant group first
    pub fn write_varint(&mut self, value: u32) -> EsfResult<()> {
        let mut groups = [0u8; MAX_VARINT_BYTES];
        let mut count = 0;
        let mut rest = value;
        loop {
            groups[count] = (rest & 0x7F) as u8;
            count += 1;
            rest >>= 7;
            if rest == 0 {
                break;
            }
        }

        for i in (0..count).rev() {
            let continues = if i > 0 { 0x80 } else { 0 };
            self.write_u8(groups[i] | continues);
        }
        Ok(())
    }

    /// Reserve four bytes for a u32 filled in later by [`Self::patch_u32`]
    pub fn reserve_u32(&mut self) -> usize {
        let at = self.position();
        self.write_u32(0);
        at
    }

    /// Overwrite four previously written bytes
    pub fn patch_u32(&mut self, at: usize, value: u32) -> EsfResult<()> {
        let len = self.buf.len();
        let slot = self
            .buf
            .get_mut(at..at + 4)
            .ok_or(EsfError::InvalidLength {
                offset: at,
                declared: 4,
                available: len.saturating_sub(at),
            })?;
        slot.copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Write characters U+0000..=U+00FF as single bytes (no prefix)
    pub fn write_ascii(&mut self, value: &str) -> EsfResult<()> {
        for ch in value.chars() {
            let byte = u8::try_from(u32::from(ch)).map_err(|_| EsfError::InvalidString {
                offset: self.position(),
                reason: format!("character {ch:?} is outside the single-byte range"),
            })?;
            self.write_u8(byte);
        }
        Ok(())
    }

    /// Write an ASCII string with a u16 character count prefix
    pub fn write_ascii_prefixed(&mut self, value: &str) -> EsfResult<()> {
        let chars = value.chars().count();
        self.write_u16(u16::try_from(chars).map_err(|_| EsfError::ValueOutOfRange {
            field: "string length",
            value: chars as u64,
        })?);
        self.write_ascii(value)
    }

    /// Write a UTF-16 string with a u16 code unit count prefix
    pub fn write_utf16_prefixed(&mut self, value: &str) -> EsfResult<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_u16(
            u16::try_from(units.len()).map_err(|_| EsfError::ValueOutOfRange {
                field: "string length",
                value: units.len() as u64,
            })?,
        );
        for unit in units {
            self.write_u16(unit);
        }
        Ok(())
    }
}
