//! File digest helpers for hash-manifest verification.

use sha2::{Digest, Sha256, Sha384, Sha512};

/// Compute the lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Compute the lowercase hex SHA-384 digest of `bytes`.
#[must_use]
pub fn sha384_hex(bytes: &[u8]) -> String {
    hex::encode(Sha384::digest(bytes))
}

/// Compute the lowercase hex SHA-512 digest of `bytes`.
#[must_use]
pub fn sha512_hex(bytes: &[u8]) -> String {
    hex::encode(Sha512::digest(bytes))
}

/// Compute a digest by algorithm name as it appears in a hash manifest.
///
/// Returns `None` for algorithms this verifier does not support; callers
/// treat that as a non-matching entry (fail-closed).
#[must_use]
pub fn digest_hex(algorithm: &str, bytes: &[u8]) -> Option<String> {
    match algorithm {
        "sha256" => Some(sha256_hex(bytes)),
        "sha384" => Some(sha384_hex(bytes)),
        "sha512" => Some(sha512_hex(bytes)),
        _ => None,
    }
}
