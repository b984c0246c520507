//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors that can occur while handling keys and signatures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The hex encoding of a key or signature is invalid.
    #[error("invalid hex encoding")]
    InvalidHex,
    /// The decoded key is not a valid 32-byte Ed25519 public key.
    #[error("invalid Ed25519 public key")]
    InvalidKey,
    /// The decoded signature is not 64 bytes.
    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),
    /// The signature does not verify over the given message.
    #[error("signature mismatch")]
    SignatureMismatch,
}
