//! SHA-256 digest computation and verification
//!
//! Archive entries store a SHA-256 digest over the *compressed* payload
//! bytes exactly as stored. Verification happens before decompression, so
//! a corrupted blob is rejected without ever reaching the codec.

use sha2::{Digest, Sha256};

/// Length in bytes of a stored entry digest (SHA-256)
pub const DIGEST_LEN: usize = 32;

/// Compute the SHA-256 digest of a byte slice
pub fn sha256(bytes: &[u8]) -> [u8; DIGEST_LEN] {
    Sha256::digest(bytes).into()
}

/// Verify that `expected` is the SHA-256 digest of `bytes`
///
/// `expected` must be exactly [`DIGEST_LEN`] bytes; any other length fails
/// closed. The comparison folds over every byte regardless of where the
/// first difference occurs.
pub fn verify(bytes: &[u8], expected: &[u8]) -> bool {
    if expected.len() != DIGEST_LEN {
        return false;
    }
    let computed = sha256(bytes);
    let mut diff = 0u8;
    for (a, b) in computed.iter().zip(expected.iter()) {
        diff |= a ^ b;
    }
    diff == 0
}
