//! Node-name and string tables
//!
//! Every document carries a node-name table: record names referenced by
//! index. Variants with string tables also carry one table per string
//! encoding (UTF-16 and ASCII), mapping ids to values.
//!
//! String ids are not contiguous. Parsed ids are kept, so re-encoding an
//! unmodified document reproduces them exactly; only values first seen
//! during an encode get new ids, taken from the lowest unused slot.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{trace, warn};

use crate::error::{EsfError, EsfResult};
use crate::io::{EsfReader, EsfWriter, to_u32};

/// Names a node-name table can hold (the on-disk count is a u16)
const MAX_NODE_NAMES: usize = u16::MAX as usize;

/// Ordered list of record names, indexed by u16
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeNameTable {
    names: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, u16>,
}

impl NodeNameTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a table: u16 count, then count prefixed ASCII names
    pub fn read(reader: &mut EsfReader<'_>) -> EsfResult<Self> {
        let count = reader.read_u16()? as usize;
        let mut table = Self::new();
        for _ in 0..count {
            let name = reader.read_ascii_prefixed()?;
            table.push(name);
        }
        trace!("Read {} node names", table.len());
        Ok(table)
    }

    /// Write the table in index order
    pub fn write(&self, writer: &mut EsfWriter) -> EsfResult<()> {
        let count = u16::try_from(self.names.len())
            .map_err(|_| EsfError::TooManyNames(self.names.len()))?;
        writer.write_u16(count);
        for name in &self.names {
            writer.write_ascii_prefixed(name)?;
        }
        Ok(())
    }

    // Duplicate names on disk keep their slot; lookups resolve to the first
    fn push(&mut self, name: String) {
        let index = self.names.len() as u16;
        self.index.entry(name.clone()).or_insert(index);
        self.names.push(name);
    }

    /// Name at `index`
    pub fn get(&self, index: u16) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    /// Index of `name`, if present
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.index.get(name).copied()
    }

    /// Index of `name`, appending it when new
    pub fn intern(&mut self, name: &str) -> EsfResult<u16> {
        if name.is_empty() {
            return Err(EsfError::EmptyName);
        }
        if let Some(index) = self.index_of(name) {
            return Ok(index);
        }
        if self.names.len() >= MAX_NODE_NAMES {
            return Err(EsfError::TooManyNames(self.names.len() + 1));
        }
        let index = self.names.len() as u16;
        self.push(name.to_string());
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in index order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.index.clear();
    }
}

/// Bidirectional id/value map for one string encoding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringTable {
    by_id: BTreeMap<u32, String>,
    #[serde(skip)]
    by_value: HashMap<String, u32>,
    /// Id 0 stands for an empty string with no table entry
    #[serde(skip)]
    zero_is_empty: bool,
    /// Lowest id that may still be free
    #[serde(skip)]
    scan_from: u32,
}

impl StringTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a table: u32 count, then `[len u16, chars, id u32]` entries
    ///
    /// Duplicate ids are logged and the first entry wins.
    pub fn read(reader: &mut EsfReader<'_>, utf16: bool) -> EsfResult<Self> {
        let count = reader.read_u32()?;
        let mut table = Self::new();
        for _ in 0..count {
            let value = if utf16 {
                reader.read_utf16_prefixed()?
            } else {
                reader.read_ascii_prefixed()?
            };
            let id = reader.read_u32()?;
            table.insert_parsed(id, value);
        }
        trace!(
            "Read {} {} strings",
            table.len(),
            if utf16 { "UTF-16" } else { "ASCII" }
        );
        Ok(table)
    }

    /// Write the table in ascending id order
    pub fn write(&self, writer: &mut EsfWriter, utf16: bool) -> EsfResult<()> {
        writer.write_u32(to_u32(self.by_id.len(), "string table size")?);
        for (id, value) in &self.by_id {
            if utf16 {
                writer.write_utf16_prefixed(value)?;
            } else {
                writer.write_ascii_prefixed(value)?;
            }
            writer.write_u32(*id);
        }
        Ok(())
    }

    /// Add an entry read from disk; returns false if the id was taken
    pub fn insert_parsed(&mut self, id: u32, value: String) -> bool {
        if let Some(existing) = self.by_id.get(&id) {
            if *existing != value {
                warn!(
                    "Duplicate string id {}: keeping {:?}, ignoring {:?}",
                    id, existing, value
                );
            }
            return false;
        }
        self.by_value.entry(value.clone()).or_insert(id);
        self.by_id.insert(id, value);
        true
    }

    /// Bind `id` to `value`, replacing whatever either was bound to
    pub fn assign(&mut self, id: u32, value: &str) {
        if let Some(old) = self.by_id.insert(id, value.to_string()) {
            if self.by_value.get(&old) == Some(&id) {
                self.by_value.remove(&old);
                // Another id may still carry the old value
                if let Some((&other, _)) = self.by_id.iter().find(|(_, v)| **v == old) {
                    self.by_value.insert(old, other);
                }
            }
        }
        self.by_value.insert(value.to_string(), id);
        if id == 0 {
            self.zero_is_empty = false;
        }
    }

    /// Value bound to `id`
    pub fn get(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Resolve an id read from the stream
    ///
    /// Id 0 without an entry is the empty string.
    pub fn resolve(&self, id: u32, offset: usize) -> EsfResult<&str> {
        match self.get(id) {
            Some(value) => Ok(value),
            None if id == 0 => Ok(""),
            None => Err(EsfError::UnknownStringId { id, offset }),
        }
    }

    /// Id bound to `value`, if any
    pub fn id_of(&self, value: &str) -> Option<u32> {
        self.by_value.get(value).copied()
    }

    /// Id for `value`, allocating the lowest free id when it is new
    pub fn intern(&mut self, value: &str) -> EsfResult<u32> {
        if let Some(id) = self.id_of(value) {
            return Ok(id);
        }
        if value.is_empty() && !self.by_id.contains_key(&0) {
            self.zero_is_empty = true;
            return Ok(0);
        }

        let id = self.next_free_id()?;
        self.by_id.insert(id, value.to_string());
        self.by_value.insert(value.to_string(), id);
        self.scan_from = id.saturating_add(1);
        trace!("Allocated string id {} for {:?}", id, value);
        Ok(id)
    }

    fn next_free_id(&self) -> EsfResult<u32> {
        let mut id = self.scan_from;
        loop {
            let taken = self.by_id.contains_key(&id) || (id == 0 && self.zero_is_empty);
            if !taken {
                return Ok(id);
            }
            id = id.checked_add(1).ok_or(EsfError::ValueOutOfRange {
                field: "string id",
                value: u64::from(u32::MAX) + 1,
            })?;
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Entries in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.by_id.iter().map(|(id, v)| (*id, v.as_str()))
    }

    /// Remove every entry and restart allocation from 0
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_value.clear();
        self.zero_is_empty = false;
        self.scan_from = 0;
    }
}

/// The UTF-16 and ASCII string tables of one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringTables {
    pub utf16: StringTable,
    pub ascii: StringTable,
}

impl StringTables {
    /// Read both tables, UTF-16 first
    pub fn read(reader: &mut EsfReader<'_>) -> EsfResult<Self> {
        Ok(Self {
            utf16: StringTable::read(reader, true)?,
            ascii: StringTable::read(reader, false)?,
        })
    }

    /// Write both tables, UTF-16 first
    pub fn write(&self, writer: &mut EsfWriter) -> EsfResult<()> {
        self.utf16.write(writer, true)?;
        self.ascii.write(writer, false)
    }

    /// Table for the given string encoding
    pub fn table_mut(&mut self, utf16: bool) -> &mut StringTable {
        if utf16 { &mut self.utf16 } else { &mut self.ascii }
    }

    /// Table for the given string encoding
    pub fn table(&self, utf16: bool) -> &StringTable {
        if utf16 { &self.utf16 } else { &self.ascii }
    }

    pub fn clear(&mut self) {
        self.utf16.clear();
        self.ascii.clear();
    }
}
