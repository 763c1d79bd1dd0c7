//! LZMA compression of nested documents
//!
//! Compressed payloads use raw LZMA: the stream data is stored apart from
//! its 5-byte property block (lc/lp/pb byte plus u32 dictionary size) and
//! the uncompressed size, which live in a separate info record.

use lzma_rs::decompress;
use std::io::{Cursor, Write};
use xz2::stream::{LzmaOptions, Stream};
use xz2::write::XzEncoder;

use crate::error::{EsfError, EsfResult};

/// Length of the LZMA property block
pub const PROPERTIES_LEN: usize = 5;

/// Property block plus the u64 size field of an `.lzma` stream header
const ALONE_HEADER_LEN: usize = PROPERTIES_LEN + 8;

/// Encoder preset (liblzma's default level)
const COMPRESSION_PRESET: u32 = 6;

/// Decompress an LZMA stream of a known uncompressed size
///
/// Sizes above `limit` are refused before any work is done.
pub fn decompress_document(
    properties: &[u8],
    data: &[u8],
    size: usize,
    limit: usize,
) -> EsfResult<Vec<u8>> {
    if size > limit {
        return Err(EsfError::DecompressionLimit { size, limit });
    }
    if properties.len() != PROPERTIES_LEN {
        return Err(EsfError::Decompression(format!(
            "expected {PROPERTIES_LEN} property bytes, found {}",
            properties.len()
        )));
    }

    let mut input = Vec::with_capacity(PROPERTIES_LEN + data.len());
    input.extend_from_slice(properties);
    input.extend_from_slice(data);

    let options = decompress::Options {
        unpacked_size: decompress::UnpackedSize::UseProvided(Some(size as u64)),
        ..Default::default()
    };
    let mut output = Vec::with_capacity(size);
    lzma_rs::lzma_decompress_with_options(&mut Cursor::new(input), &mut output, &options)
        .map_err(|e| EsfError::Decompression(e.to_string()))?;

    if output.len() != size {
        return Err(EsfError::DecompressedSizeMismatch {
            expected: size,
            actual: output.len(),
        });
    }
    Ok(output)
}

/// Compress a document, returning `(properties, data)`
///
/// The encoder writes an `.lzma` stream; its header is split into the
/// property block and a size field that is dropped, since the uncompressed
/// size is stored separately.
pub fn compress_document(data: &[u8]) -> EsfResult<(Vec<u8>, Vec<u8>)> {
    let options = LzmaOptions::new_preset(COMPRESSION_PRESET)
        .map_err(|e| EsfError::Compression(e.to_string()))?;
    let stream =
        Stream::new_lzma_encoder(&options).map_err(|e| EsfError::Compression(e.to_string()))?;

    let mut encoder = XzEncoder::new_stream(Vec::with_capacity(data.len() / 4), stream);
    encoder
        .write_all(data)
        .map_err(|e| EsfError::Compression(e.to_string()))?;
    let mut output = encoder
        .finish()
        .map_err(|e| EsfError::Compression(e.to_string()))?;

    if output.len() < ALONE_HEADER_LEN {
        return Err(EsfError::Compression(format!(
            "encoder produced {} bytes, shorter than the stream header",
            output.len()
        )));
    }
    let stream = output.split_off(ALONE_HEADER_LEN);
    output.truncate(PROPERTIES_LEN);
    Ok((output, stream))
}
