//! Record-tree encoding

use crate::error::EsfResult;
use crate::io::{EsfWriter, SizeEncoding, to_u32};
use crate::node::{ArrayNode, Node, RecordBlockNode, RecordNode, ValueNode};
use crate::tables::{NodeNameTable, StringTables};
use crate::types::{TypeCode, ValueKind};
use crate::value::{TYPE26_TRAILER, Value, fit_array_code, fit_code};
use crate::variant::Variant;

/// Largest version the short compact info form can hold
const SHORT_INFO_MAX_VERSION: u8 = 0x0F;

/// Largest name index the short compact info form can hold
const SHORT_INFO_MAX_NAME: u16 = 0x01FF;

/// Writes nodes for one encode session, growing its tables as it goes
pub(crate) struct Encoder<'a> {
    pub variant: Variant,
    pub names: &'a mut NodeNameTable,
    pub strings: &'a mut StringTables,
}

impl Encoder<'_> {
    /// Write one node and everything below it
    pub fn write_node(&mut self, node: &Node, writer: &mut EsfWriter) -> EsfResult<()> {
        self.write_child(node, false, writer)
    }

    /// Write a node that may directly follow a type 26 value without trailer
    ///
    /// The decoder takes a 0x9C byte after such a value as its trailer, so a
    /// record that would start with 0x9C uses the long info form instead.
    fn write_child(
        &mut self,
        node: &Node,
        after_type26: bool,
        writer: &mut EsfWriter,
    ) -> EsfResult<()> {
        match node {
            Node::Value(value) => self.write_value_node(value, writer),
            Node::Array(array) => self.write_array(array, writer),
            Node::Raw(raw) => {
                writer.write_u8(TypeCode::UINT8_ARRAY.0);
                self.write_sized(writer, |_, w| {
                    w.write_bytes(&raw.data);
                    Ok(())
                })
            }
            Node::Record(record) => self.write_record(record, after_type26, writer),
            Node::Block(block) => self.write_block(block, after_type26, writer),
            Node::Compressed(compressed) => {
                let record = compressed.to_record()?;
                self.write_record(&record, after_type26, writer)
            }
        }
    }

    fn write_value_node(&mut self, node: &ValueNode, writer: &mut EsfWriter) -> EsfResult<()> {
        let code = fit_code(node.code(), node.value(), self.variant.is_compact());
        writer.write_u8(code.0);
        self.write_value(code, node.value(), writer)
    }

    fn write_value(&mut self, code: TypeCode, value: &Value, writer: &mut EsfWriter) -> EsfResult<()> {
        match (code.value_kind(), value) {
            (Some(ValueKind::Utf16), Value::Utf16(s)) => self.write_string(s, true, writer),
            (Some(ValueKind::Ascii), Value::Ascii(s)) => self.write_string(s, false, writer),
            _ => value.write_fixed(code, writer),
        }
    }

    fn write_string(&mut self, value: &str, utf16: bool, writer: &mut EsfWriter) -> EsfResult<()> {
        if self.variant.uses_string_tables() {
            let id = self.strings.table_mut(utf16).intern(value)?;
            writer.write_u32(id);
            Ok(())
        } else if utf16 {
            writer.write_utf16_prefixed(value)
        } else {
            writer.write_ascii_prefixed(value)
        }
    }

    fn write_array(&mut self, array: &ArrayNode, writer: &mut EsfWriter) -> EsfResult<()> {
        let code = fit_array_code(array.code(), array.items(), self.variant.is_compact());
        let element = code.element_type();
        writer.write_u8(code.0);
        self.write_sized(writer, |enc, w| {
            for item in array.items() {
                enc.write_value(element, item, w)?;
            }
            Ok(())
        })
    }

    fn write_record(
        &mut self,
        record: &RecordNode,
        after_type26: bool,
        writer: &mut EsfWriter,
    ) -> EsfResult<()> {
        let index = self.names.intern(&record.name)?;
        self.write_record_header(index, record.version, false, after_type26, writer);
        self.write_sized(writer, |enc, w| enc.write_children(&record.children, w))
    }

    fn write_block(
        &mut self,
        block: &RecordBlockNode,
        after_type26: bool,
        writer: &mut EsfWriter,
    ) -> EsfResult<()> {
        let index = self.names.intern(&block.name)?;
        self.write_record_header(index, block.version, true, after_type26, writer);
        self.write_sized(writer, |enc, w| {
            let count = to_u32(block.entries.len(), "block entry count")?;
            if enc.variant.is_compact() {
                w.write_varint(count)?;
            } else {
                w.write_u32(count);
            }
            for entry in &block.entries {
                enc.write_sized(w, |enc, w| enc.write_children(entry, w))?;
            }
            Ok(())
        })
    }

    fn write_children(&mut self, children: &[Node], writer: &mut EsfWriter) -> EsfResult<()> {
        let mut after_type26 = false;
        for child in children {
            self.write_child(child, after_type26, writer)?;
            after_type26 = matches!(
                child,
                Node::Value(node) if matches!(node.value(), Value::Type26(v) if !v.has_trailer())
            );
        }
        Ok(())
    }

    fn write_record_header(
        &self,
        index: u16,
        version: u8,
        block: bool,
        after_type26: bool,
        writer: &mut EsfWriter,
    ) {
        if !self.variant.is_compact() {
            let code = if block {
                TypeCode::RECORD_BLOCK
            } else {
                TypeCode::RECORD
            };
            writer.write_u8(code.0);
            writer.write_u16(index);
            writer.write_u8(version);
            return;
        }

        let block_bit = if block { TypeCode::BLOCK_BIT } else { 0 };
        let short = TypeCode::RECORD_BIT | block_bit | (version << 1) | (index >> 8) as u8;
        let fits_short = version <= SHORT_INFO_MAX_VERSION && index <= SHORT_INFO_MAX_NAME;
        if fits_short && !(after_type26 && short == TYPE26_TRAILER) {
            writer.write_u8(short);
            writer.write_u8(index as u8);
        } else {
            writer.write_u8(TypeCode::RECORD_BIT | block_bit | TypeCode::LONG_INFO_BIT);
            writer.write_u16(index);
            writer.write_u8(version);
        }
    }

    /// Write a size field followed by the payload `body` produces
    ///
    /// Absolute sizes are patched in place once the end is known; varint
    /// sizes need the payload length up front, so the payload goes through
    /// a scratch buffer.
    fn write_sized<F>(&mut self, writer: &mut EsfWriter, body: F) -> EsfResult<()>
    where
        F: FnOnce(&mut Self, &mut EsfWriter) -> EsfResult<()>,
    {
        match self.variant.size_encoding() {
            SizeEncoding::Absolute => {
                let at = writer.reserve_u32();
                body(self, writer)?;
                let end = to_u32(writer.position(), "offset")?;
                writer.patch_u32(at, end)
            }
            SizeEncoding::VarInt => {
                let mut scratch = EsfWriter::new();
                body(self, &mut scratch)?;
                SizeEncoding::VarInt.write_size(writer, scratch.position())?;
                writer.write_bytes(scratch.as_slice());
                Ok(())
            }
        }
    }
}
