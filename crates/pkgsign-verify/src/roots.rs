//! Compiled-in root keys that bootstrap the trust chain.

use pkgsign_core::types::KeyId;

/// The root public keys of the reference deployment (hex).
///
/// Roots are trusted unconditionally for the `key` and `revoke`
/// capabilities only. They never expire, are never fetched remotely, and
/// are never checked against the revocation list.
pub const DEFAULT_ROOT_KEYS: [&str; 2] = [
    "39f6eb7cd5c98ff9244dc8489a1f9f793510c456a9e2a8349319e18808136634",
    "e470c61ff127b87010dd8f4bd8d12fa2c59967f19ccbabc18ea3b0ca3602275d",
];

/// An immutable set of unconditionally trusted root keys.
#[derive(Debug, Clone)]
pub struct RootKeySet {
    keys: Vec<KeyId>,
}

impl RootKeySet {
    /// Create a root set from explicit keys (dependency injection for
    /// hosts and tests).
    #[must_use]
    pub fn new(keys: Vec<KeyId>) -> Self {
        Self { keys }
    }

    /// Return `true` if `key` is a root.
    #[must_use]
    pub fn contains(&self, key: &KeyId) -> bool {
        self.keys.contains(key)
    }

    /// The root keys in this set.
    #[must_use]
    pub fn keys(&self) -> &[KeyId] {
        &self.keys
    }
}

impl Default for RootKeySet {
    fn default() -> Self {
        Self {
            keys: DEFAULT_ROOT_KEYS
                .iter()
                .filter_map(|k| KeyId::from_hex(k).ok())
                .collect(),
        }
    }
}
