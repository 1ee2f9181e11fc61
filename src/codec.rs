//! Bounded decompression gateway
//!
//! Archive payloads are zstd-compressed. Decoding always runs against a
//! hard ceiling on output size so that a hostile or corrupted stream can
//! never balloon past [`MAX_DECOMPRESSED_SIZE`]. Payload integrity is the
//! digest verifier's job; zstd frames written without a trailing checksum
//! decode fine here.

use crate::error::{ReliquaryError, Result};

/// Decompression ceiling: the maximum decompressed size ever produced (256 MiB)
pub const MAX_DECOMPRESSED_SIZE: usize = 256 * 1024 * 1024;

/// Decompress a zstd payload, bounded by [`MAX_DECOMPRESSED_SIZE`]
///
/// Returns the decompressed bytes in a buffer trimmed to their exact
/// length. A stream that would decode past the ceiling fails with
/// [`ReliquaryError::DecompressionFailed`]; output landing exactly on the
/// ceiling is success.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    decompress_bounded(compressed, MAX_DECOMPRESSED_SIZE)
}

/// Decompress with an explicit ceiling
///
/// The decode buffer is allocated at ceiling capacity, so the codec can
/// never write past the bound; the buffer is resized capacity-to-length
/// before it is handed back.
fn decompress_bounded(compressed: &[u8], ceiling: usize) -> Result<Vec<u8>> {
    if compressed.is_empty() {
        return Err(ReliquaryError::EmptyInput);
    }

    let mut output = zstd::bulk::decompress(compressed, ceiling)
        .map_err(|e| ReliquaryError::DecompressionFailed(e.to_string()))?;

    // The scratch buffer is ceiling-sized; do not retain that capacity.
    output.shrink_to_fit();
    Ok(output)
}
