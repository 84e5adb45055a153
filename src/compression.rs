//! Gzip codec for large text payloads.
//!
//! Empty text maps to an empty blob without touching the compressor, and an
//! empty blob decodes back to the empty string. Only the round-trip law is
//! a contract; the exact compressed bytes may change between versions.

use crate::error::CodecError;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

/// Compress `text`. Returns an empty vector for empty input.
pub fn encode(text: &str) -> Result<Vec<u8>, CodecError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut encoder = GzEncoder::new(Vec::with_capacity(text.len() / 2), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .map_err(CodecError::Compress)?;
    encoder.finish().map_err(CodecError::Compress)
}

/// Decompress a blob produced by [`encode`].
pub fn decode(blob: &[u8]) -> Result<String, CodecError> {
    if blob.is_empty() {
        return Ok(String::new());
    }

    let mut decoder = GzDecoder::new(blob);
    let mut raw = Vec::with_capacity(blob.len().saturating_mul(3));
    decoder
        .read_to_end(&mut raw)
        .map_err(CodecError::Decompress)?;
    Ok(String::from_utf8(raw)?)
}

/// `compressed / original`, or `0.0` when there was nothing to compress.
#[allow(clippy::cast_precision_loss)]
pub fn compression_ratio(original_bytes: usize, compressed_bytes: usize) -> f64 {
    if original_bytes == 0 {
        return 0.0;
    }
    compressed_bytes as f64 / original_bytes as f64
}
