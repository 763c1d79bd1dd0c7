//! Record-tree decoding

use tracing::trace;

use crate::codec::CodecOptions;
use crate::compressed::CompressedNode;
use crate::error::{EsfError, EsfResult};
use crate::io::EsfReader;
use crate::node::{ArrayNode, Node, RawNode, RecordBlockNode, RecordNode, ValueNode};
use crate::tables::{NodeNameTable, StringTables};
use crate::types::{TypeCode, ValueKind};
use crate::value::Value;
use crate::variant::Variant;

/// Reads nodes using the tables of one document
pub(crate) struct Decoder<'a> {
    pub variant: Variant,
    pub names: &'a NodeNameTable,
    pub strings: &'a StringTables,
    pub options: &'a CodecOptions,
    /// Records currently open around the read position
    pub depth: usize,
}

impl Decoder<'_> {
    /// Read one node, dispatching on its type code
    pub fn read_node(&mut self, reader: &mut EsfReader<'_>) -> EsfResult<Node> {
        let offset = reader.position();
        let byte = reader.read_u8()?;

        if self.variant.is_compact() && TypeCode::is_compact_record(byte) {
            return self.read_compact_record(byte, offset, reader);
        }

        let code = TypeCode(byte);
        match code {
            TypeCode::RECORD if !self.variant.is_compact() => self.read_record(offset, reader),
            TypeCode::RECORD_BLOCK if !self.variant.is_compact() => {
                self.read_block(offset, reader)
            }
            c if c.is_raw() => {
                let len = self.variant.size_encoding().read_size(reader)?;
                Ok(Node::Raw(RawNode::new(reader.read_bytes(len)?.to_vec())))
            }
            c if c.is_array() => self.read_array(code, reader),
            c if c.is_value() => {
                let value = self.read_value(code, reader)?;
                Ok(Node::Value(ValueNode::new(code, value)?))
            }
            c if (0x41..0x80).contains(&c.0) => {
                Err(EsfError::InvalidArrayElement { code: byte, offset })
            }
            _ => Err(EsfError::UnknownTypeCode { code: byte, offset }),
        }
    }

    fn read_value(&self, code: TypeCode, reader: &mut EsfReader<'_>) -> EsfResult<Value> {
        match code.value_kind() {
            Some(ValueKind::Utf16) => Ok(Value::Utf16(self.read_string(reader, true)?)),
            Some(ValueKind::Ascii) => Ok(Value::Ascii(self.read_string(reader, false)?)),
            _ => Value::read_fixed(code, reader),
        }
    }

    fn read_string(&self, reader: &mut EsfReader<'_>, utf16: bool) -> EsfResult<String> {
        if self.variant.uses_string_tables() {
            let offset = reader.position();
            let id = reader.read_u32()?;
            Ok(self.strings.table(utf16).resolve(id, offset)?.to_string())
        } else if utf16 {
            reader.read_utf16_prefixed()
        } else {
            reader.read_ascii_prefixed()
        }
    }

    fn read_array(&self, code: TypeCode, reader: &mut EsfReader<'_>) -> EsfResult<Node> {
        let len = self.variant.size_encoding().read_size(reader)?;
        let start = reader.position();
        let end = start + len;
        let element = code.element_type();

        let items = reader.bounded(end, |reader| {
            let mut items = Vec::new();
            while reader.position() < end {
                items.push(self.read_value(element, reader)?);
            }
            Ok(items)
        })?;
        expect_end(start, end, reader)?;
        Ok(Node::Array(ArrayNode::new(code, items)?))
    }

    fn record_name(&self, index: u16, offset: usize) -> EsfResult<String> {
        self.names
            .get(index)
            .map(str::to_string)
            .ok_or(EsfError::UnknownNodeName { index, offset })
    }

    /// Children up to `len` bytes from the current position
    fn read_children(&mut self, len: usize, reader: &mut EsfReader<'_>) -> EsfResult<Vec<Node>> {
        let start = reader.position();
        let end = start + len;
        let children = reader.bounded(end, |reader| {
            let mut children = Vec::new();
            while reader.position() < end {
                children.push(self.read_node(reader)?);
            }
            Ok(children)
        })?;
        expect_end(start, end, reader)?;
        Ok(children)
    }

    /// Run `read` one record level deeper
    fn nested<T, F>(&mut self, offset: usize, read: F) -> EsfResult<T>
    where
        F: FnOnce(&mut Self) -> EsfResult<T>,
    {
        if self.depth >= self.options.max_depth {
            return Err(EsfError::NestingTooDeep {
                offset,
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = read(self);
        self.depth -= 1;
        result
    }

    fn read_record(&mut self, offset: usize, reader: &mut EsfReader<'_>) -> EsfResult<Node> {
        let index = reader.read_u16()?;
        let name = self.record_name(index, offset)?;
        let version = reader.read_u8()?;
        let len = self.variant.size_encoding().read_size(reader)?;
        trace!("Record {} v{} at offset {} ({} bytes)", name, version, offset, len);

        let children = self.nested(offset, |dec| dec.read_children(len, reader))?;
        self.finish_record(RecordNode {
            name,
            version,
            children,
        })
    }

    fn read_block(&mut self, offset: usize, reader: &mut EsfReader<'_>) -> EsfResult<Node> {
        let index = reader.read_u16()?;
        let name = self.record_name(index, offset)?;
        let version = reader.read_u8()?;
        let len = self.variant.size_encoding().read_size(reader)?;
        let start = reader.position();
        let count = reader.read_u32()?;
        trace!("Block {} v{} at offset {} ({} entries)", name, version, offset, count);

        let entries = self.nested(offset, |dec| dec.read_entries(count, reader))?;
        expect_end(start, start + len, reader)?;
        Ok(Node::Block(RecordBlockNode {
            name,
            version,
            entries,
        }))
    }

    fn read_entries(&mut self, count: u32, reader: &mut EsfReader<'_>) -> EsfResult<Vec<Vec<Node>>> {
        let mut entries = Vec::new();
        for _ in 0..count {
            let len = self.variant.size_encoding().read_size(reader)?;
            entries.push(self.read_children(len, reader)?);
        }
        Ok(entries)
    }

    fn read_compact_record(
        &mut self,
        info: u8,
        offset: usize,
        reader: &mut EsfReader<'_>,
    ) -> EsfResult<Node> {
        let is_block = info & TypeCode::BLOCK_BIT != 0;
        let (index, version) = if info & TypeCode::LONG_INFO_BIT != 0 {
            let index = reader.read_u16()?;
            (index, reader.read_u8()?)
        } else {
            let low = reader.read_u8()?;
            ((u16::from(info & 0x01) << 8) | u16::from(low), (info >> 1) & 0x0F)
        };
        let name = self.record_name(index, offset)?;
        let len = reader.read_varint()? as usize;
        if len > reader.remaining() {
            return Err(EsfError::InvalidLength {
                offset,
                declared: len as u64,
                available: reader.remaining(),
            });
        }

        if is_block {
            let start = reader.position();
            let count = reader.read_varint()?;
            trace!("Block {} v{} at offset {} ({} entries)", name, version, offset, count);
            let entries = self.nested(offset, |dec| dec.read_entries(count, reader))?;
            expect_end(start, start + len, reader)?;
            Ok(Node::Block(RecordBlockNode {
                name,
                version,
                entries,
            }))
        } else {
            trace!("Record {} v{} at offset {} ({} bytes)", name, version, offset, len);
            let children = self.nested(offset, |dec| dec.read_children(len, reader))?;
            self.finish_record(RecordNode {
                name,
                version,
                children,
            })
        }
    }

    fn finish_record(&self, record: RecordNode) -> EsfResult<Node> {
        if self.options.expand_compressed && record.name == CompressedNode::NAME {
            return CompressedNode::expand(record, self.options);
        }
        Ok(Node::Record(record))
    }
}

fn expect_end(start: usize, end: usize, reader: &EsfReader<'_>) -> EsfResult<()> {
    if reader.position() == end {
        Ok(())
    } else {
        Err(EsfError::NodeOverrun {
            start,
            end,
            reached: reader.position(),
        })
    }
}
