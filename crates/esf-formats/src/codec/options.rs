//! Codec configuration

/// Default ceiling for a nested payload's uncompressed size (1 GiB)
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 1 << 30;

/// Default ceiling for record nesting while decoding
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How string and node-name tables are treated when encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringTableMode {
    /// Keep parsed ids; allocate only for values not seen before
    #[default]
    Preserve,
    /// Start every encode from empty tables
    Reset,
}

/// Options carried by a [`Codec`](super::Codec)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    pub string_tables: StringTableMode,
    /// Decode COMPRESSED_DATA records into nested documents
    pub expand_compressed: bool,
    /// Largest uncompressed size accepted for a nested payload
    pub max_decompressed_size: usize,
    /// Deepest record nesting accepted while decoding
    pub max_depth: usize,
    /// Refresh the header timestamp on encode
    pub stamp_edit_time: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            string_tables: StringTableMode::Preserve,
            expand_compressed: true,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            stamp_edit_time: false,
        }
    }
}

impl CodecOptions {
    #[must_use]
    pub fn with_string_tables(mut self, mode: StringTableMode) -> Self {
        self.string_tables = mode;
        self
    }

    #[must_use]
    pub fn with_expand_compressed(mut self, expand: bool) -> Self {
        self.expand_compressed = expand;
        self
    }

    #[must_use]
    pub fn with_max_decompressed_size(mut self, limit: usize) -> Self {
        self.max_decompressed_size = limit;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn with_stamp_edit_time(mut self, stamp: bool) -> Self {
        self.stamp_edit_time = stamp;
        self
    }
}
