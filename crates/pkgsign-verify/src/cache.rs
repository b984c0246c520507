//! Process-lifetime cache of resolved key records.

use std::collections::HashMap;

use pkgsign_core::documents::KeyManifest;
use pkgsign_core::types::KeyId;

/// The cached outcome of resolving one key.
///
/// `Unresolved` is a negative result: the key's manifest could not be
/// fetched or did not validate. It short-circuits repeated remote lookups
/// for the same key within a session; a fresh process re-resolves.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// The key's manifest was fetched and its certificate chain validated.
    Resolved(KeyManifest),
    /// Resolution failed; the key is unknown for this process's lifetime.
    Unresolved,
}

/// Key-id → resolution outcome. Entries are never evicted.
///
/// Root keys are not stored here: the resolver answers for them before the
/// cache is consulted, so seeding is unnecessary.
#[derive(Debug, Default)]
pub struct KeyCache {
    entries: HashMap<KeyId, CacheEntry>,
}

impl KeyCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the cached outcome for `key`.
    #[must_use]
    pub fn get(&self, key: &KeyId) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Record the outcome for `key`. Re-deriving the same key's status is
    /// safe, so a concurrent duplicate insert is last-writer-wins.
    pub fn insert(&mut self, key: KeyId, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    /// Number of cached outcomes (positive and negative).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if nothing has been resolved yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
