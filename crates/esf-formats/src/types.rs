//! Type codes identifying node kinds and their wire shape

use serde::Serialize;
use std::fmt;

/// Offset between a scalar code and the code of an array of it
pub const ARRAY_OFFSET: u8 = 0x40;

/// Which Rust value a type code carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Coord2d,
    Coord3d,
    Utf16,
    Ascii,
    Angle,
    Type26,
}

impl ValueKind {
    /// Short lowercase name used in errors and text forms
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "int8",
            Self::I16 => "int16",
            Self::I32 => "int32",
            Self::I64 => "int64",
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::U32 => "uint32",
            Self::U64 => "uint64",
            Self::F32 => "single",
            Self::F64 => "double",
            Self::Coord2d => "coord2d",
            Self::Coord3d => "coord3d",
            Self::Utf16 => "utf16",
            Self::Ascii => "ascii",
            Self::Angle => "angle",
            Self::Type26 => "type26",
        }
    }

    /// Plain (non-compact) code for this kind
    pub const fn plain_code(self) -> TypeCode {
        match self {
            Self::Bool => TypeCode::BOOL,
            Self::I8 => TypeCode::INT8,
            Self::I16 => TypeCode::INT16,
            Self::I32 => TypeCode::INT32,
            Self::I64 => TypeCode::INT64,
            Self::U8 => TypeCode::UINT8,
            Self::U16 => TypeCode::UINT16,
            Self::U32 => TypeCode::UINT32,
            Self::U64 => TypeCode::UINT64,
            Self::F32 => TypeCode::SINGLE,
            Self::F64 => TypeCode::DOUBLE,
            Self::Coord2d => TypeCode::COORD2D,
            Self::Coord3d => TypeCode::COORD3D,
            Self::Utf16 => TypeCode::UTF16,
            Self::Ascii => TypeCode::ASCII,
            Self::Angle => TypeCode::ANGLE,
            Self::Type26 => TypeCode::TYPE26,
        }
    }
}

/// Single-byte tag identifying a node's kind and wire shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TypeCode(pub u8);

impl TypeCode {
    pub const BOOL: Self = Self(0x01);
    pub const INT8: Self = Self(0x02);
    pub const INT16: Self = Self(0x03);
    pub const INT32: Self = Self(0x04);
    pub const INT64: Self = Self(0x05);
    pub const UINT8: Self = Self(0x06);
    pub const UINT16: Self = Self(0x07);
    pub const UINT32: Self = Self(0x08);
    pub const UINT64: Self = Self(0x09);
    pub const SINGLE: Self = Self(0x0A);
    pub const DOUBLE: Self = Self(0x0B);
    pub const COORD2D: Self = Self(0x0C);
    pub const COORD3D: Self = Self(0x0D);
    pub const UTF16: Self = Self(0x0E);
    pub const ASCII: Self = Self(0x0F);
    pub const ANGLE: Self = Self(0x10);

    // Compact encodings
    pub const BOOL_TRUE: Self = Self(0x12);
    pub const BOOL_FALSE: Self = Self(0x13);
    pub const UINT32_ZERO: Self = Self(0x14);
    pub const UINT32_ONE: Self = Self(0x15);
    pub const UINT32_BYTE: Self = Self(0x16);
    pub const UINT32_SHORT: Self = Self(0x17);
    pub const UINT32_24BIT: Self = Self(0x18);
    pub const INT32_ZERO: Self = Self(0x19);
    pub const INT32_BYTE: Self = Self(0x1A);
    pub const INT32_SHORT: Self = Self(0x1B);
    pub const INT32_24BIT: Self = Self(0x1C);
    pub const SINGLE_ZERO: Self = Self(0x1D);

    pub const TYPE26: Self = Self(0x26);

    pub const BOOL_ARRAY: Self = Self(0x41);
    pub const INT8_ARRAY: Self = Self(0x42);
    pub const INT16_ARRAY: Self = Self(0x43);
    pub const INT32_ARRAY: Self = Self(0x44);
    pub const INT64_ARRAY: Self = Self(0x45);
    /// Raw byte blob
    pub const UINT8_ARRAY: Self = Self(0x46);
    pub const UINT16_ARRAY: Self = Self(0x47);
    pub const UINT32_ARRAY: Self = Self(0x48);
    pub const UINT64_ARRAY: Self = Self(0x49);
    pub const SINGLE_ARRAY: Self = Self(0x4A);
    pub const DOUBLE_ARRAY: Self = Self(0x4B);
    pub const COORD2D_ARRAY: Self = Self(0x4C);
    pub const COORD3D_ARRAY: Self = Self(0x4D);
    pub const UTF16_ARRAY: Self = Self(0x4E);
    pub const ASCII_ARRAY: Self = Self(0x4F);
    pub const ANGLE_ARRAY: Self = Self(0x50);
    pub const UINT32_BYTE_ARRAY: Self = Self(0x56);
    pub const UINT32_SHORT_ARRAY: Self = Self(0x57);
    pub const UINT32_24BIT_ARRAY: Self = Self(0x58);
    pub const INT32_BYTE_ARRAY: Self = Self(0x5A);
    pub const INT32_SHORT_ARRAY: Self = Self(0x5B);
    pub const INT32_24BIT_ARRAY: Self = Self(0x5C);

    /// Classic record
    pub const RECORD: Self = Self(0x80);
    /// Classic record block
    pub const RECORD_BLOCK: Self = Self(0x81);

    /// Compact record info: set on every record
    pub const RECORD_BIT: u8 = 0x80;
    /// Compact record info: set on blocks
    pub const BLOCK_BIT: u8 = 0x40;
    /// Compact record info: name index and version follow in full
    pub const LONG_INFO_BIT: u8 = 0x20;

    /// Value kind carried by a scalar code
    pub const fn value_kind(self) -> Option<ValueKind> {
        Some(match self.0 {
            0x01 | 0x12 | 0x13 => ValueKind::Bool,
            0x02 => ValueKind::I8,
            0x03 => ValueKind::I16,
            0x04 | 0x19..=0x1C => ValueKind::I32,
            0x05 => ValueKind::I64,
            0x06 => ValueKind::U8,
            0x07 => ValueKind::U16,
            0x08 | 0x14..=0x18 => ValueKind::U32,
            0x09 => ValueKind::U64,
            0x0A | 0x1D => ValueKind::F32,
            0x0B => ValueKind::F64,
            0x0C => ValueKind::Coord2d,
            0x0D => ValueKind::Coord3d,
            0x0E => ValueKind::Utf16,
            0x0F => ValueKind::Ascii,
            0x10 => ValueKind::Angle,
            0x26 => ValueKind::Type26,
            _ => return None,
        })
    }

    /// Whether this is a scalar value code
    pub const fn is_value(self) -> bool {
        self.value_kind().is_some()
    }

    /// Whether this is one of the compact scalar encodings
    pub const fn is_compact(self) -> bool {
        matches!(self.0, 0x12..=0x1D)
    }

    /// Fixed payload width of a scalar code; `None` for strings and type 26
    pub const fn payload_width(self) -> Option<usize> {
        Some(match self.0 {
            0x12..=0x15 | 0x19 | 0x1D => 0,
            0x01 | 0x02 | 0x06 | 0x16 | 0x1A => 1,
            0x03 | 0x07 | 0x10 | 0x17 | 0x1B => 2,
            0x18 | 0x1C => 3,
            0x04 | 0x08 | 0x0A => 4,
            0x05 | 0x09 | 0x0B | 0x0C => 8,
            0x0D => 12,
            _ => return None,
        })
    }

    /// Whether this is the raw byte blob code
    pub const fn is_raw(self) -> bool {
        self.0 == Self::UINT8_ARRAY.0
    }

    /// Whether this is an array code with a usable element type
    pub const fn is_array(self) -> bool {
        if self.0 < 0x41 || self.0 >= 0x80 || self.is_raw() {
            return false;
        }
        let element = Self(self.0 - ARRAY_OFFSET);
        match element.payload_width() {
            Some(width) => width > 0,
            None => matches!(element.0, 0x0E | 0x0F),
        }
    }

    /// Element code of an array code (outer code minus the array offset)
    pub const fn element_type(self) -> Self {
        Self(self.0.wrapping_sub(ARRAY_OFFSET))
    }

    /// Array code whose elements have this code
    pub const fn array_type(self) -> Self {
        Self(self.0 + ARRAY_OFFSET)
    }

    /// Whether a byte read where a node starts introduces a compact record
    pub const fn is_compact_record(byte: u8) -> bool {
        byte & Self::RECORD_BIT != 0
    }

    /// Whether this is a compact array code
    pub const fn is_compact_array(self) -> bool {
        self.is_array() && self.element_type().is_compact()
    }

    /// Symbolic name, if the code is known
    pub const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0x01 => "BOOL",
            0x02 => "INT8",
            0x03 => "INT16",
            0x04 => "INT32",
            0x05 => "INT64",
            0x06 => "UINT8",
            0x07 => "UINT16",
            0x08 => "UINT32",
            0x09 => "UINT64",
            0x0A => "SINGLE",
            0x0B => "DOUBLE",
            0x0C => "COORD2D",
            0x0D => "COORD3D",
            0x0E => "UTF16",
            0x0F => "ASCII",
            0x10 => "ANGLE",
            0x12 => "BOOL_TRUE",
            0x13 => "BOOL_FALSE",
            0x14 => "UINT32_ZERO",
            0x15 => "UINT32_ONE",
            0x16 => "UINT32_BYTE",
            0x17 => "UINT32_SHORT",
            0x18 => "UINT32_24BIT",
            0x19 => "INT32_ZERO",
            0x1A => "INT32_BYTE",
            0x1B => "INT32_SHORT",
            0x1C => "INT32_24BIT",
            0x1D => "SINGLE_ZERO",
            0x26 => "TYPE26",
            0x41 => "BOOL_ARRAY",
            0x42 => "INT8_ARRAY",
            0x43 => "INT16_ARRAY",
            0x44 => "INT32_ARRAY",
            0x45 => "INT64_ARRAY",
            0x46 => "UINT8_ARRAY",
            0x47 => "UINT16_ARRAY",
            0x48 => "UINT32_ARRAY",
            0x49 => "UINT64_ARRAY",
            0x4A => "SINGLE_ARRAY",
            0x4B => "DOUBLE_ARRAY",
            0x4C => "COORD2D_ARRAY",
            0x4D => "COORD3D_ARRAY",
            0x4E => "UTF16_ARRAY",
            0x4F => "ASCII_ARRAY",
            0x50 => "ANGLE_ARRAY",
            0x56 => "UINT32_BYTE_ARRAY",
            0x57 => "UINT32_SHORT_ARRAY",
            0x58 => "UINT32_24BIT_ARRAY",
            0x5A => "INT32_BYTE_ARRAY",
            0x5B => "INT32_SHORT_ARRAY",
            0x5C => "INT32_24BIT_ARRAY",
            0x80 => "RECORD",
            0x81 => "RECORD_BLOCK",
            _ => return None,
        })
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_codes_offset_from_element() {
        assert_eq!(TypeCode::INT32.array_type(), TypeCode::INT32_ARRAY);
        assert_eq!(TypeCode::INT32_ARRAY.element_type(), TypeCode::INT32);
        assert_eq!(
            TypeCode::UINT32_BYTE_ARRAY.element_type(),
            TypeCode::UINT32_BYTE
        );
        assert!(TypeCode::ASCII_ARRAY.is_array());
        assert!(TypeCode::UINT32_24BIT_ARRAY.is_compact_array());
    }

    #[test]
    fn test_raw_and_zero_width_arrays_are_not_arrays() {
        assert!(!TypeCode::UINT8_ARRAY.is_array());
        assert!(TypeCode::UINT8_ARRAY.is_raw());
        // BOOL_TRUE + 0x40 has no element width
        assert!(!TypeCode(0x52).is_array());
        assert!(!TypeCode(0x54).is_array());
        assert!(!TypeCode(0x66).is_array());
        assert!(!TypeCode::RECORD.is_array());
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(TypeCode::INT32_24BIT.value_kind(), Some(ValueKind::I32));
        assert_eq!(TypeCode::UINT32_ONE.value_kind(), Some(ValueKind::U32));
        assert_eq!(TypeCode::BOOL_FALSE.value_kind(), Some(ValueKind::Bool));
        assert_eq!(TypeCode::SINGLE_ZERO.value_kind(), Some(ValueKind::F32));
        assert_eq!(TypeCode::RECORD.value_kind(), None);
        assert_eq!(ValueKind::U32.plain_code(), TypeCode::UINT32);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TypeCode::INT32.to_string(), "INT32");
        assert_eq!(TypeCode::RECORD_BLOCK.to_string(), "RECORD_BLOCK");
        assert_eq!(TypeCode(0x7E).to_string(), "0x7E");
    }
}
