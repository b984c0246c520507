//! Validated newtype wrappers for trust-chain domain primitives.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a domain value fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The value is empty.
    #[error("value must not be empty")]
    Empty,
    /// The hex string is not the expected length.
    #[error("expected {expected} hex characters, got {got}")]
    InvalidHexLength {
        /// Expected number of hex characters.
        expected: usize,
        /// Actual number of characters.
        got: usize,
    },
    /// The hex string contains non-hex characters.
    #[error("value contains non-hex characters")]
    InvalidHex,
    /// The value contains disallowed characters.
    #[error("value contains invalid characters: only lowercase alphanumeric and hyphens allowed")]
    InvalidCharacters,
}

/// A 32-byte Ed25519 public key identity, stored as 64 lowercase hex
/// characters. The key-id *is* the public key; there is no separate
/// fingerprint scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl TryFrom<String> for KeyId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

impl KeyId {
    /// Parse a `KeyId` from a hex string, normalizing to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the string is not exactly 64 hex
    /// characters.
    pub fn from_hex(hex: &str) -> Result<Self, ValidationError> {
        if hex.len() != 64 {
            return Err(ValidationError::InvalidHexLength {
                expected: 64,
                got: hex.len(),
            });
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidHex);
        }
        Ok(Self(hex.to_ascii_lowercase()))
    }

    /// Return the lowercase hex representation.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A capability tag naming what a key is authorized to sign.
///
/// The vocabulary is open (`key`, `revoke`, `core`, `plugins`, `themes`,
/// `translations`, …); validation only constrains the character set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Capability(String);

impl TryFrom<String> for Capability {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Capability> for String {
    fn from(capability: Capability) -> Self {
        capability.0
    }
}

impl Capability {
    /// Create a new `Capability` from a tag string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the tag is empty or contains
    /// characters other than lowercase letters, digits, and hyphens.
    pub fn new(tag: &str) -> Result<Self, ValidationError> {
        if tag.is_empty() {
            return Err(ValidationError::Empty);
        }
        if !tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ValidationError::InvalidCharacters);
        }
        Ok(Self(tag.to_owned()))
    }

    /// The capability authorizing a key to certify other keys.
    #[must_use]
    pub fn key() -> Self {
        Self("key".to_owned())
    }

    /// The capability authorizing a key to sign the revocation list.
    #[must_use]
    pub fn revoke() -> Self {
        Self("revoke".to_owned())
    }

    /// Return the inner tag string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
