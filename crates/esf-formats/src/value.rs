//! Scalar values carried by value and array nodes
//!
//! Fixed-width payloads are read and written here. Strings are not: their
//! wire form depends on the codec variant (inline or table-indexed), so the
//! codec handles them and only hands finished strings to this module.

use serde::Serialize;
use std::fmt;

use crate::error::{EsfError, EsfResult};
use crate::io::{EsfReader, EsfWriter};
use crate::types::{TypeCode, ValueKind};

/// Byte that, directly after a type 26 payload, belongs to it
pub(crate) const TYPE26_TRAILER: u8 = 0x9C;

/// Data length of a type 26 value whose first byte is not a length
const TYPE26_SHORT_LEN: usize = 7;

/// Two-dimensional coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coord2d {
    pub x: f32,
    pub y: f32,
}

/// Three-dimensional coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coord3d {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Opaque type 26 payload
///
/// Observed in two shapes: a short form of one byte plus seven data bytes,
/// and a long form whose first byte (a non-zero multiple of 8) gives the
/// data length. Either form may carry a trailing 0x9C byte.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Type26 {
    /// First byte after the type code
    pub first: u8,
    /// Remaining bytes, including the 0x9C trailer when present
    pub data: Vec<u8>,
}

impl Type26 {
    /// Data length implied by the first byte, without a trailer
    fn base_len(first: u8) -> usize {
        if first != 0 && first % 8 == 0 {
            first as usize
        } else {
            TYPE26_SHORT_LEN
        }
    }

    /// Whether `data` carries the trailing 0x9C byte
    pub fn has_trailer(&self) -> bool {
        self.data.len() > Self::base_len(self.first) && self.data.last() == Some(&TYPE26_TRAILER)
    }

    fn read(reader: &mut EsfReader<'_>) -> EsfResult<Self> {
        let first = reader.read_u8()?;
        let mut data = reader.read_bytes(Self::base_len(first))?.to_vec();
        if reader.peek_u8() == Some(TYPE26_TRAILER) {
            data.push(reader.read_u8()?);
        }
        Ok(Self { first, data })
    }

    fn write(&self, writer: &mut EsfWriter) {
        writer.write_u8(self.first);
        writer.write_bytes(&self.data);
    }
}

impl fmt::Display for Type26 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{}", self.first, hex::encode(&self.data))
    }
}

/// A single scalar value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Coord2d(Coord2d),
    Coord3d(Coord3d),
    Utf16(String),
    Ascii(String),
    Angle(u16),
    Type26(Type26),
}

impl Value {
    /// Kind of this value
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::I16(_) => ValueKind::I16,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Coord2d(_) => ValueKind::Coord2d,
            Self::Coord3d(_) => ValueKind::Coord3d,
            Self::Utf16(_) => ValueKind::Utf16,
            Self::Ascii(_) => ValueKind::Ascii,
            Self::Angle(_) => ValueKind::Angle,
            Self::Type26(_) => ValueKind::Type26,
        }
    }

    /// String content, for either string kind
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf16(s) | Self::Ascii(s) => Some(s),
            _ => None,
        }
    }

    /// Check that this value can be stored under `code`
    pub fn check_kind(&self, code: TypeCode) -> EsfResult<()> {
        if code.value_kind() == Some(self.kind()) {
            Ok(())
        } else {
            Err(EsfError::TypeMismatch {
                code: code.to_string(),
                found: self.kind().name(),
            })
        }
    }

    /// Read the payload of a non-string scalar code
    pub fn read_fixed(code: TypeCode, reader: &mut EsfReader<'_>) -> EsfResult<Self> {
        Ok(match code {
            TypeCode::BOOL => Self::Bool(reader.read_u8()? != 0),
            TypeCode::BOOL_TRUE => Self::Bool(true),
            TypeCode::BOOL_FALSE => Self::Bool(false),
            TypeCode::INT8 => Self::I8(reader.read_i8()?),
            TypeCode::INT16 => Self::I16(reader.read_i16()?),
            TypeCode::INT32 => Self::I32(reader.read_i32()?),
            TypeCode::INT32_ZERO => Self::I32(0),
            TypeCode::INT32_BYTE => Self::I32(i32::from(reader.read_i8()?)),
            TypeCode::INT32_SHORT => Self::I32(i32::from(reader.read_i16()?)),
            TypeCode::INT32_24BIT => Self::I32(reader.read_i24()?),
            TypeCode::INT64 => Self::I64(reader.read_i64()?),
            TypeCode::UINT8 => Self::U8(reader.read_u8()?),
            TypeCode::UINT16 => Self::U16(reader.read_u16()?),
            TypeCode::UINT32 => Self::U32(reader.read_u32()?),
            TypeCode::UINT32_ZERO => Self::U32(0),
            TypeCode::UINT32_ONE => Self::U32(1),
            TypeCode::UINT32_BYTE => Self::U32(u32::from(reader.read_u8()?)),
            TypeCode::UINT32_SHORT => Self::U32(u32::from(reader.read_u16()?)),
            TypeCode::UINT32_24BIT => Self::U32(reader.read_u24()?),
            TypeCode::UINT64 => Self::U64(reader.read_u64()?),
            TypeCode::SINGLE => Self::F32(reader.read_f32()?),
            TypeCode::SINGLE_ZERO => Self::F32(0.0),
            TypeCode::DOUBLE => Self::F64(reader.read_f64()?),
            TypeCode::COORD2D => Self::Coord2d(Coord2d {
                x: reader.read_f32()?,
                y: reader.read_f32()?,
            }),
            TypeCode::COORD3D => Self::Coord3d(Coord3d {
                x: reader.read_f32()?,
                y: reader.read_f32()?,
                z: reader.read_f32()?,
            }),
            TypeCode::ANGLE => Self::Angle(reader.read_u16()?),
            TypeCode::TYPE26 => Self::Type26(Type26::read(reader)?),
            _ => {
                return Err(EsfError::UnknownTypeCode {
                    code: code.0,
                    offset: reader.position(),
                });
            }
        })
    }

    /// Write the payload of a non-string scalar under `code`
    ///
    /// `code` must already fit the value (see [`fit_code`]).
    pub fn write_fixed(&self, code: TypeCode, writer: &mut EsfWriter) -> EsfResult<()> {
        self.check_kind(code)?;
        if !fits(code, self) {
            return Err(EsfError::TypeMismatch {
                code: code.to_string(),
                found: "out-of-range",
            });
        }

        match (code, self) {
            (TypeCode::BOOL, Self::Bool(v)) => writer.write_u8(u8::from(*v)),
            (
                TypeCode::BOOL_TRUE
                | TypeCode::BOOL_FALSE
                | TypeCode::INT32_ZERO
                | TypeCode::UINT32_ZERO
                | TypeCode::UINT32_ONE
                | TypeCode::SINGLE_ZERO,
                _,
            ) => {}
            (TypeCode::INT8, Self::I8(v)) => writer.write_i8(*v),
            (TypeCode::INT16, Self::I16(v)) => writer.write_i16(*v),
            (TypeCode::INT32, Self::I32(v)) => writer.write_i32(*v),
            (TypeCode::INT32_BYTE, Self::I32(v)) => writer.write_i8(*v as i8),
            (TypeCode::INT32_SHORT, Self::I32(v)) => writer.write_i16(*v as i16),
            (TypeCode::INT32_24BIT, Self::I32(v)) => writer.write_i24(*v),
            (TypeCode::INT64, Self::I64(v)) => writer.write_i64(*v),
            (TypeCode::UINT8, Self::U8(v)) => writer.write_u8(*v),
            (TypeCode::UINT16, Self::U16(v)) => writer.write_u16(*v),
            (TypeCode::UINT32, Self::U32(v)) => writer.write_u32(*v),
            (TypeCode::UINT32_BYTE, Self::U32(v)) => writer.write_u8(*v as u8),
            (TypeCode::UINT32_SHORT, Self::U32(v)) => writer.write_u16(*v as u16),
            (TypeCode::UINT32_24BIT, Self::U32(v)) => writer.write_u24(*v),
            (TypeCode::UINT64, Self::U64(v)) => writer.write_u64(*v),
            (TypeCode::SINGLE, Self::F32(v)) => writer.write_f32(*v),
            (TypeCode::DOUBLE, Self::F64(v)) => writer.write_f64(*v),
            (TypeCode::COORD2D, Self::Coord2d(c)) => {
                writer.write_f32(c.x);
                writer.write_f32(c.y);
            }
            (TypeCode::COORD3D, Self::Coord3d(c)) => {
                writer.write_f32(c.x);
                writer.write_f32(c.y);
                writer.write_f32(c.z);
            }
            (TypeCode::ANGLE, Self::Angle(v)) => writer.write_u16(*v),
            (TypeCode::TYPE26, Self::Type26(v)) => v.write(writer),
            _ => {
                return Err(EsfError::TypeMismatch {
                    code: code.to_string(),
                    found: self.kind().name(),
                });
            }
        }
        Ok(())
    }

    /// Parse the text form produced by `Display`
    pub fn from_text(kind: ValueKind, text: &str) -> EsfResult<Self> {
        let invalid = || EsfError::InvalidText {
            kind: kind.name(),
            text: text.to_string(),
        };
        let trimmed = text.trim();

        Ok(match kind {
            ValueKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => Self::Bool(true),
                "false" | "0" => Self::Bool(false),
                _ => return Err(invalid()),
            },
            ValueKind::I8 => Self::I8(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::I16 => Self::I16(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::I32 => Self::I32(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::I64 => Self::I64(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::U8 => Self::U8(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::U16 => Self::U16(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::U32 => Self::U32(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::U64 => Self::U64(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::F32 => Self::F32(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::F64 => Self::F64(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::Angle => Self::Angle(trimmed.parse().map_err(|_| invalid())?),
            ValueKind::Coord2d => {
                let parts = parse_floats(trimmed).ok_or_else(invalid)?;
                match parts.as_slice() {
                    [x, y] => Self::Coord2d(Coord2d { x: *x, y: *y }),
                    _ => return Err(invalid()),
                }
            }
            ValueKind::Coord3d => {
                let parts = parse_floats(trimmed).ok_or_else(invalid)?;
                match parts.as_slice() {
                    [x, y, z] => Self::Coord3d(Coord3d {
                        x: *x,
                        y: *y,
                        z: *z,
                    }),
                    _ => return Err(invalid()),
                }
            }
            // Strings keep surrounding whitespace
            ValueKind::Utf16 => Self::Utf16(text.to_string()),
            ValueKind::Ascii => Self::Ascii(text.to_string()),
            ValueKind::Type26 => {
                let (first, data) = trimmed.split_once(':').ok_or_else(invalid)?;
                Self::Type26(Type26 {
                    first: u8::from_str_radix(first, 16).map_err(|_| invalid())?,
                    data: hex::decode(data).map_err(|_| invalid())?,
                })
            }
        })
    }
}

fn parse_floats(text: &str) -> Option<Vec<f32>> {
    text.split(',').map(|p| p.trim().parse().ok()).collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) | Self::Angle(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Coord2d(c) => write!(f, "{},{}", c.x, c.y),
            Self::Coord3d(c) => write!(f, "{},{},{}", c.x, c.y, c.z),
            Self::Utf16(s) | Self::Ascii(s) => f.write_str(s),
            Self::Type26(v) => write!(f, "{v}"),
        }
    }
}

/// Whether `value` can be written under `code` without loss
pub fn fits(code: TypeCode, value: &Value) -> bool {
    match (code, value) {
        (TypeCode::BOOL_TRUE, Value::Bool(v)) => *v,
        (TypeCode::BOOL_FALSE, Value::Bool(v)) => !*v,
        (TypeCode::UINT32_ZERO, Value::U32(v)) => *v == 0,
        (TypeCode::UINT32_ONE, Value::U32(v)) => *v == 1,
        (TypeCode::UINT32_BYTE, Value::U32(v)) => *v <= 0xFF,
        (TypeCode::UINT32_SHORT, Value::U32(v)) => *v <= 0xFFFF,
        (TypeCode::UINT32_24BIT, Value::U32(v)) => *v <= 0xFF_FFFF,
        (TypeCode::INT32_ZERO, Value::I32(v)) => *v == 0,
        (TypeCode::INT32_BYTE, Value::I32(v)) => i8::try_from(*v).is_ok(),
        (TypeCode::INT32_SHORT, Value::I32(v)) => i16::try_from(*v).is_ok(),
        (TypeCode::INT32_24BIT, Value::I32(v)) => (-0x80_0000..0x80_0000).contains(v),
        // Only positive zero has an all-zero bit pattern
        (TypeCode::SINGLE_ZERO, Value::F32(v)) => v.to_bits() == 0,
        _ => code.value_kind() == Some(value.kind()),
    }
}

/// Narrowest compact code for a value of a compactable kind
pub fn narrowest_code(value: &Value) -> TypeCode {
    match value {
        Value::Bool(true) => TypeCode::BOOL_TRUE,
        Value::Bool(false) => TypeCode::BOOL_FALSE,
        Value::U32(v) => match *v {
            0 => TypeCode::UINT32_ZERO,
            1 => TypeCode::UINT32_ONE,
            0..=0xFF => TypeCode::UINT32_BYTE,
            0..=0xFFFF => TypeCode::UINT32_SHORT,
            0..=0xFF_FFFF => TypeCode::UINT32_24BIT,
            _ => TypeCode::UINT32,
        },
        Value::I32(v) => {
            if *v == 0 {
                TypeCode::INT32_ZERO
            } else if i8::try_from(*v).is_ok() {
                TypeCode::INT32_BYTE
            } else if i16::try_from(*v).is_ok() {
                TypeCode::INT32_SHORT
            } else if (-0x80_0000..0x80_0000).contains(v) {
                TypeCode::INT32_24BIT
            } else {
                TypeCode::INT32
            }
        }
        Value::F32(v) if v.to_bits() == 0 => TypeCode::SINGLE_ZERO,
        other => other.kind().plain_code(),
    }
}

/// Code to write a scalar under
///
/// Plain codes are kept. A compact code is kept while the value fits it;
/// otherwise compact variants move to the narrowest fitting compact code and
/// classic variants fall back to the plain code.
pub fn fit_code(code: TypeCode, value: &Value, compact_variant: bool) -> TypeCode {
    if !code.is_compact() {
        return code;
    }
    if !compact_variant {
        return value.kind().plain_code();
    }
    if fits(code, value) {
        code
    } else {
        narrowest_code(value)
    }
}

/// Code to write an array under, by the same rules as [`fit_code`]
pub fn fit_array_code(code: TypeCode, items: &[Value], compact_variant: bool) -> TypeCode {
    if !code.is_compact_array() {
        return code;
    }
    let element = code.element_type();
    if compact_variant && items.iter().all(|item| fits(element, item)) {
        return code;
    }
    match element.value_kind() {
        Some(kind) => kind.plain_code().array_type(),
        None => code,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode(code: TypeCode, value: &Value) -> Vec<u8> {
        let mut writer = EsfWriter::new();
        value
            .write_fixed(code, &mut writer)
            .expect("Test operation should succeed");
        writer.into_inner()
    }

    fn decode(code: TypeCode, bytes: &[u8]) -> Value {
        let mut reader = EsfReader::new(bytes);
        let value = Value::read_fixed(code, &mut reader).expect("Test operation should succeed");
        assert_eq!(reader.remaining(), 0, "{code} left bytes unread");
        value
    }

    #[test]
    fn test_compact_codes_decode_to_wide_values() {
        assert_eq!(decode(TypeCode::UINT32_ZERO, &[]), Value::U32(0));
        assert_eq!(decode(TypeCode::UINT32_ONE, &[]), Value::U32(1));
        assert_eq!(decode(TypeCode::UINT32_BYTE, &[0xFE]), Value::U32(254));
        assert_eq!(
            decode(TypeCode::UINT32_24BIT, &[0x01, 0x02, 0x03]),
            Value::U32(0x030201)
        );
        assert_eq!(decode(TypeCode::INT32_BYTE, &[0xFF]), Value::I32(-1));
        assert_eq!(decode(TypeCode::INT32_SHORT, &[0x00, 0x80]), Value::I32(-32768));
        assert_eq!(decode(TypeCode::BOOL_TRUE, &[]), Value::Bool(true));
        assert_eq!(decode(TypeCode::SINGLE_ZERO, &[]), Value::F32(0.0));
    }

    #[test]
    fn test_fixed_payload_widths_match_type_codes() {
        let samples = [
            (TypeCode::BOOL, Value::Bool(true)),
            (TypeCode::INT16, Value::I16(-5)),
            (TypeCode::INT64, Value::I64(i64::MIN)),
            (TypeCode::UINT16, Value::U16(65535)),
            (TypeCode::DOUBLE, Value::F64(1.5)),
            (TypeCode::COORD2D, Value::Coord2d(Coord2d { x: 1.0, y: -2.0 })),
            (
                TypeCode::COORD3D,
                Value::Coord3d(Coord3d {
                    x: 1.0,
                    y: 2.0,
                    z: 3.0,
                }),
            ),
            (TypeCode::ANGLE, Value::Angle(900)),
            (TypeCode::UINT32_SHORT, Value::U32(0x1234)),
            (TypeCode::INT32_24BIT, Value::I32(-0x12345)),
        ];

        for (code, value) in samples {
            let bytes = encode(code, &value);
            assert_eq!(Some(bytes.len()), code.payload_width(), "{code}");
            assert_eq!(decode(code, &bytes), value, "{code}");
        }
    }

    #[test]
    fn test_type26_short_and_long_forms() {
        // Short form: 7 data bytes
        let short = [0x01, 0x00, 0x01, 0x20, 0x00, 0x00, 0x00, 0x00];
        let value = decode(TypeCode::TYPE26, &short);
        assert_eq!(
            value,
            Value::Type26(Type26 {
                first: 1,
                data: vec![0x00, 0x01, 0x20, 0x00, 0x00, 0x00, 0x00],
            })
        );
        assert_eq!(encode(TypeCode::TYPE26, &value), short);

        // Long form with trailer: first byte 0x10 is the data length
        let mut long = vec![0x10];
        long.extend_from_slice(&[0x01; 16]);
        long.push(TYPE26_TRAILER);
        let value = decode(TypeCode::TYPE26, &long);
        let Value::Type26(inner) = &value else {
            panic!("expected type 26 value");
        };
        assert_eq!(inner.data.len(), 17);
        assert!(inner.has_trailer());
        assert_eq!(encode(TypeCode::TYPE26, &value), long);

        // A long payload whose last data byte happens to be 0x9C is not a trailer
        let mut data = vec![0; 15];
        data.push(TYPE26_TRAILER);
        assert!(!Type26 { first: 0x10, data }.has_trailer());
    }

    #[test]
    fn test_type26_trailer_not_consumed_when_absent() {
        let bytes = [0x00, 1, 2, 3, 4, 5, 6, 7, 0x42];
        let mut reader = EsfReader::new(&bytes);
        let value =
            Value::read_fixed(TypeCode::TYPE26, &mut reader).expect("Test operation should succeed");
        assert_eq!(reader.remaining(), 1);
        assert_eq!(value.to_string(), "00:01020304050607");
    }

    #[test]
    fn test_fit_code_keeps_fitting_compact_codes() {
        assert_eq!(
            fit_code(TypeCode::UINT32_BYTE, &Value::U32(200), true),
            TypeCode::UINT32_BYTE
        );
        assert_eq!(
            fit_code(TypeCode::UINT32_BYTE, &Value::U32(666), true),
            TypeCode::UINT32_SHORT
        );
        assert_eq!(
            fit_code(TypeCode::INT32_ZERO, &Value::I32(-1), true),
            TypeCode::INT32_BYTE
        );
        assert_eq!(
            fit_code(TypeCode::BOOL_TRUE, &Value::Bool(false), true),
            TypeCode::BOOL_FALSE
        );
        // Classic variants never write compact codes
        assert_eq!(
            fit_code(TypeCode::UINT32_ONE, &Value::U32(1), false),
            TypeCode::UINT32
        );
        // Plain codes stay plain
        assert_eq!(
            fit_code(TypeCode::UINT32, &Value::U32(0), true),
            TypeCode::UINT32
        );
    }

    #[test]
    fn test_fit_array_code_widens() {
        let items = vec![Value::U32(1), Value::U32(300)];
        assert_eq!(
            fit_array_code(TypeCode::UINT32_BYTE_ARRAY, &items, true),
            TypeCode::UINT32_ARRAY
        );
        let items = vec![Value::U32(1), Value::U32(3)];
        assert_eq!(
            fit_array_code(TypeCode::UINT32_BYTE_ARRAY, &items, true),
            TypeCode::UINT32_BYTE_ARRAY
        );
        assert_eq!(
            fit_array_code(TypeCode::UINT32_BYTE_ARRAY, &items, false),
            TypeCode::UINT32_ARRAY
        );
    }

    #[test]
    fn test_write_rejects_wrong_kind() {
        let mut writer = EsfWriter::new();
        let err = Value::Bool(true)
            .write_fixed(TypeCode::INT32, &mut writer)
            .unwrap_err();
        assert!(matches!(err, EsfError::TypeMismatch { .. }));
    }

    #[test]
    fn test_text_round_trip() {
        let samples = [
            Value::Bool(false),
            Value::I8(-128),
            Value::I64(i64::MAX),
            Value::U64(u64::MAX),
            Value::F32(0.1),
            Value::F64(-1.0e-300),
            Value::Coord2d(Coord2d { x: 0.5, y: 12.25 }),
            Value::Coord3d(Coord3d {
                x: -1.0,
                y: 0.0,
                z: 3.75,
            }),
            Value::Ascii(" padded ".to_string()),
            Value::Utf16("\u{4e2d}\u{6587}".to_string()),
            Value::Angle(359),
            Value::Type26(Type26 {
                first: 8,
                data: vec![1, 0, 0, 0, 0, 0, 0, 0],
            }),
        ];

        for value in samples {
            let text = value.to_string();
            let parsed =
                Value::from_text(value.kind(), &text).expect("Test operation should succeed");
            assert_eq!(parsed, value, "text form {text:?}");
        }
    }

    #[test]
    fn test_from_text_rejects_garbage() {
        assert!(Value::from_text(ValueKind::I8, "300").is_err());
        assert!(Value::from_text(ValueKind::Coord2d, "1,2,3").is_err());
        assert!(Value::from_text(ValueKind::Bool, "maybe").is_err());
    }
}
