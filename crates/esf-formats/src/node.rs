//! In-memory ESF node tree
//!
//! A document is a tree of [`Node`]s. Leaves are typed scalars, arrays of
//! scalars and raw byte blobs; inner nodes are named records, record blocks
//! (a named list of record entries) and compressed sub-documents.
//!
//! Nodes hold no reference to a codec. String values are plain Rust strings
//! and are mapped to table ids only while a codec encodes the tree.

use serde::Serialize;
use std::fmt;

use crate::compressed::CompressedNode;
use crate::error::{EsfError, EsfResult};
use crate::types::{TypeCode, ValueKind};
use crate::value::{Coord2d, Coord3d, Value};

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Value(ValueNode),
    Array(ArrayNode),
    Raw(RawNode),
    Record(RecordNode),
    Block(RecordBlockNode),
    Compressed(CompressedNode),
}

impl Node {
    /// Type code this node is written with
    pub fn type_code(&self) -> TypeCode {
        match self {
            Self::Value(v) => v.code(),
            Self::Array(a) => a.code(),
            Self::Raw(_) => TypeCode::UINT8_ARRAY,
            Self::Record(_) | Self::Compressed(_) => TypeCode::RECORD,
            Self::Block(_) => TypeCode::RECORD_BLOCK,
        }
    }

    /// Record name, for record-like nodes
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Record(r) => Some(&r.name),
            Self::Block(b) => Some(&b.name),
            Self::Compressed(_) => Some(CompressedNode::NAME),
            Self::Value(_) | Self::Array(_) | Self::Raw(_) => None,
        }
    }

    /// Whether this node contains other nodes
    pub fn is_parent(&self) -> bool {
        matches!(self, Self::Record(_) | Self::Block(_) | Self::Compressed(_))
    }

    pub fn as_record(&self) -> Option<&RecordNode> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut RecordNode> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v.value()),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v.value()),
            Self::Array(a) => write!(f, "{a}"),
            Self::Raw(r) => write!(f, "{r}"),
            Self::Record(r) => f.write_str(&r.name),
            Self::Block(b) => f.write_str(&b.name),
            Self::Compressed(_) => f.write_str(CompressedNode::NAME),
        }
    }
}

impl From<ValueNode> for Node {
    fn from(node: ValueNode) -> Self {
        Self::Value(node)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self::Value(ValueNode::from(value))
    }
}

impl From<ArrayNode> for Node {
    fn from(node: ArrayNode) -> Self {
        Self::Array(node)
    }
}

impl From<RawNode> for Node {
    fn from(node: RawNode) -> Self {
        Self::Raw(node)
    }
}

impl From<RecordNode> for Node {
    fn from(node: RecordNode) -> Self {
        Self::Record(node)
    }
}

impl From<RecordBlockNode> for Node {
    fn from(node: RecordBlockNode) -> Self {
        Self::Block(node)
    }
}

impl From<CompressedNode> for Node {
    fn from(node: CompressedNode) -> Self {
        Self::Compressed(node)
    }
}

/// A single scalar with the code it was read with
///
/// The code and value always agree in kind. A compact code may be kept
/// after the value changes; the encoder picks a code that fits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueNode {
    code: TypeCode,
    value: Value,
}

impl ValueNode {
    /// Pair a value with a scalar code of the same kind
    pub fn new(code: TypeCode, value: Value) -> EsfResult<Self> {
        value.check_kind(code)?;
        Ok(Self { code, value })
    }

    /// Parse the text form of a value for `code`
    pub fn from_text(code: TypeCode, text: &str) -> EsfResult<Self> {
        let kind = code.value_kind().ok_or_else(|| EsfError::TypeMismatch {
            code: code.to_string(),
            found: "text",
        })?;
        Self::new(code, Value::from_text(kind, text)?)
    }

    pub fn code(&self) -> TypeCode {
        self.code
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the value, keeping the code; kinds must match
    pub fn set_value(&mut self, value: Value) -> EsfResult<()> {
        value.check_kind(self.code)?;
        self.value = value;
        Ok(())
    }

    pub fn int32(value: i32) -> Self {
        Self::from(Value::I32(value))
    }

    pub fn uint32(value: u32) -> Self {
        Self::from(Value::U32(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::from(Value::Bool(value))
    }

    pub fn single(value: f32) -> Self {
        Self::from(Value::F32(value))
    }

    pub fn ascii(value: impl Into<String>) -> Self {
        Self::from(Value::Ascii(value.into()))
    }

    pub fn utf16(value: impl Into<String>) -> Self {
        Self::from(Value::Utf16(value.into()))
    }

    pub fn coord2d(x: f32, y: f32) -> Self {
        Self::from(Value::Coord2d(Coord2d { x, y }))
    }

    pub fn coord3d(x: f32, y: f32, z: f32) -> Self {
        Self::from(Value::Coord3d(Coord3d { x, y, z }))
    }
}

impl From<Value> for ValueNode {
    /// Wrap a value under the plain code of its kind
    fn from(value: Value) -> Self {
        Self {
            code: value.kind().plain_code(),
            value,
        }
    }
}

/// Homogeneous sequence of scalars
///
/// On disk the array is prefixed by the byte length of its elements, not
/// by an element count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayNode {
    code: TypeCode,
    items: Vec<Value>,
}

impl ArrayNode {
    /// Create an array; every item must match the element kind of `code`
    pub fn new(code: TypeCode, items: Vec<Value>) -> EsfResult<Self> {
        if !code.is_array() {
            return Err(EsfError::TypeMismatch {
                code: code.to_string(),
                found: "array",
            });
        }
        let element = code.element_type();
        for item in &items {
            item.check_kind(element)?;
        }
        Ok(Self { code, items })
    }

    /// Empty array of the plain array code for `kind`
    pub fn empty(kind: ValueKind) -> Self {
        Self {
            code: kind.plain_code().array_type(),
            items: Vec::new(),
        }
    }

    /// Parse the text form produced by `Display`
    pub fn from_text(code: TypeCode, text: &str) -> EsfResult<Self> {
        if !code.is_array() {
            return Err(EsfError::TypeMismatch {
                code: code.to_string(),
                found: "array",
            });
        }
        let kind = code
            .element_type()
            .value_kind()
            .ok_or_else(|| EsfError::TypeMismatch {
                code: code.to_string(),
                found: "array",
            })?;

        let items = if text.is_empty() {
            Vec::new()
        } else {
            text.split(Self::separator_for(kind))
                .map(|part| Value::from_text(kind, part))
                .collect::<EsfResult<Vec<_>>>()?
        };
        Self::new(code, items)
    }

    fn separator_for(kind: ValueKind) -> char {
        match kind {
            ValueKind::Utf16 | ValueKind::Ascii => '\n',
            _ => ' ',
        }
    }

    pub fn code(&self) -> TypeCode {
        self.code
    }

    /// Element kind
    pub fn kind(&self) -> Option<ValueKind> {
        self.code.element_type().value_kind()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item of the element kind
    pub fn push(&mut self, item: Value) -> EsfResult<()> {
        item.check_kind(self.code.element_type())?;
        self.items.push(item);
        Ok(())
    }

    /// Replace all items
    pub fn set_items(&mut self, items: Vec<Value>) -> EsfResult<()> {
        let element = self.code.element_type();
        for item in &items {
            item.check_kind(element)?;
        }
        self.items = items;
        Ok(())
    }
}

impl fmt::Display for ArrayNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = self.kind().map_or(' ', Self::separator_for);
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, "{separator}")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// Untyped byte blob
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawNode {
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl RawNode {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Parse a hex string
    pub fn from_text(text: &str) -> EsfResult<Self> {
        hex::decode(text.trim())
            .map(Self::new)
            .map_err(|_| EsfError::InvalidText {
                kind: "raw",
                text: text.to_string(),
            })
    }
}

impl fmt::Display for RawNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.data))
    }
}

mod hex_bytes {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(data))
    }
}

/// Named record with an ordered list of children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordNode {
    pub name: String,
    pub version: u8,
    pub children: Vec<Node>,
}

impl RecordNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 0,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Append a child, builder style
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Child records, in order
    pub fn records(&self) -> impl Iterator<Item = &RecordNode> {
        self.children.iter().filter_map(Node::as_record)
    }

    /// Child scalar values, in order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.children.iter().filter_map(Node::as_value)
    }

    /// First child record named `name`
    pub fn record(&self, name: &str) -> Option<&RecordNode> {
        self.records().find(|r| r.name == name)
    }
}

/// Named list of record entries sharing one name and version
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordBlockNode {
    pub name: String,
    pub version: u8,
    pub entries: Vec<Vec<Node>>,
}

impl RecordBlockNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 0,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Append an entry, builder style
    #[must_use]
    pub fn with_entry(mut self, children: Vec<Node>) -> Self {
        self.entries.push(children);
        self
    }

    /// Display name of entry `index`
    pub fn entry_name(&self, index: usize) -> String {
        format!("{} - {}", self.name, index)
    }
}
