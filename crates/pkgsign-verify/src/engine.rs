//! Hierarchical key-trust resolution.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::debug;
use pkgsign_core::documents::KeyManifest;
use pkgsign_core::types::{Capability, KeyId};
use serde_json::Value;

use crate::cache::{CacheEntry, KeyCache};
use crate::config::EngineConfig;
use crate::error::TrustError;
use crate::fetch::{BoxFuture, Fetch};
use crate::revocation::RevocationState;
use crate::roots::RootKeySet;

/// Per-call-chain state threaded through recursive trust resolution.
///
/// The context is copied down each recursion, never shared, so concurrent
/// verification requests cannot observe each other's guard state.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ChainCtx {
    /// Certificate-chain hops taken so far.
    depth: u8,
    /// Set while validating the revocation list's own signature; nested
    /// revocation checks report "not revoked" for the duration to break
    /// the cycle.
    pub(crate) in_revocation_check: bool,
}

impl ChainCtx {
    /// Take one chain hop, failing closed at the depth limit.
    fn descend(self, max_depth: u8) -> Option<Self> {
        if self.depth >= max_depth {
            None
        } else {
            Some(Self {
                depth: self.depth + 1,
                ..self
            })
        }
    }

    /// Mark the context as being inside revocation-list self-validation.
    pub(crate) fn with_revocation_guard(self) -> Self {
        Self {
            in_revocation_check: true,
            ..self
        }
    }
}

/// The verifier context: owns the key cache, the cached revocation list,
/// and the fetch collaborator. Construct one per process and share it;
/// all state is internal and explicitly owned (no hidden singletons).
pub struct TrustEngine {
    fetch: Arc<dyn Fetch>,
    config: EngineConfig,
    roots: RootKeySet,
    cache: Mutex<KeyCache>,
    pub(crate) revocation: Mutex<RevocationState>,
}

impl TrustEngine {
    /// Create an engine with the given fetch collaborator, configuration,
    /// and root key set.
    #[must_use]
    pub fn new(fetch: Arc<dyn Fetch>, config: EngineConfig, roots: RootKeySet) -> Self {
        Self {
            fetch,
            config,
            roots,
            cache: Mutex::new(KeyCache::new()),
            revocation: Mutex::new(RevocationState::NotFetched),
        }
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) fn fetcher(&self) -> &dyn Fetch {
        self.fetch.as_ref()
    }

    /// Decide whether `key` is authorized for `capability` at `at_time`.
    ///
    /// Fail-closed: unknown keys, unreachable manifests, expired windows,
    /// revocations, and over-deep chains all answer `false`. Never errors.
    pub async fn can_trust(
        &self,
        key: &KeyId,
        capability: &Capability,
        at_time: DateTime<Utc>,
    ) -> bool {
        self.can_trust_inner(key, capability, at_time, ChainCtx::default())
            .await
    }

    pub(crate) fn can_trust_inner<'a>(
        &'a self,
        key: &'a KeyId,
        capability: &'a Capability,
        at_time: DateTime<Utc>,
        ctx: ChainCtx,
    ) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            // Roots are trusted unconditionally for key certification and
            // revocation, and for nothing else. They are never fetched,
            // never expire, and skip the revocation check.
            if self.roots.contains(key) {
                return *capability == Capability::key() || *capability == Capability::revoke();
            }

            match self.check_key(key, capability, at_time, ctx).await {
                Ok(()) => true,
                Err(reason) => {
                    debug!("key {key} not trusted for '{capability}': {reason}");
                    false
                }
            }
        })
    }

    async fn check_key(
        &self,
        key: &KeyId,
        capability: &Capability,
        at_time: DateTime<Utc>,
        ctx: ChainCtx,
    ) -> Result<(), TrustError> {
        let record = self
            .resolve_key(key, ctx)
            .await
            .ok_or(TrustError::UnknownKey)?;

        if !record.grants(capability) {
            return Err(TrustError::CapabilityDenied);
        }
        if !record.valid_at(at_time) {
            return Err(if at_time < record.date {
                TrustError::NotYetValid
            } else {
                TrustError::ExpiredKey
            });
        }
        if self.is_revoked_inner(key, at_time, ctx).await {
            return Err(TrustError::RevokedKey);
        }
        Ok(())
    }

    /// Resolve the key's manifest, consulting the cache first. The outcome
    /// — success or failure — is cached before returning, so a key is
    /// fetched at most once per process.
    async fn resolve_key(&self, key: &KeyId, ctx: ChainCtx) -> Option<KeyManifest> {
        if let Some(entry) = self.lock_cache().get(key) {
            return match entry {
                CacheEntry::Resolved(manifest) => Some(manifest.clone()),
                CacheEntry::Unresolved => None,
            };
        }

        let resolved = match self.fetch_and_validate_manifest(key, ctx).await {
            Ok(manifest) => Some(manifest),
            Err(reason) => {
                debug!("manifest for {key} rejected: {reason}");
                None
            }
        };

        let entry = match &resolved {
            Some(manifest) => CacheEntry::Resolved(manifest.clone()),
            None => CacheEntry::Unresolved,
        };
        self.lock_cache().insert(key.clone(), entry);
        resolved
    }

    async fn fetch_and_validate_manifest(
        &self,
        key: &KeyId,
        ctx: ChainCtx,
    ) -> Result<KeyManifest, TrustError> {
        let url = self.config.key_manifest_url(key);
        let response = match self.fetch.fetch(&url).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!("key manifest {url} returned status {}", response.status);
                return Err(TrustError::FetchFailure);
            }
            Err(err) => {
                debug!("key manifest {url} unreachable: {err}");
                return Err(TrustError::FetchFailure);
            }
        };

        let document: Value = serde_json::from_slice(&response.body)
            .map_err(|_| TrustError::MalformedDocument)?;
        let manifest: KeyManifest = serde_json::from_value(document.clone())
            .map_err(|_| TrustError::MalformedDocument)?;

        // A manifest only certifies the key it was retrieved under.
        if manifest.key != *key {
            debug!("key manifest {url} certifies a different key");
            return Err(TrustError::UnknownKey);
        }

        let deeper = ctx
            .descend(self.config.max_chain_depth)
            .ok_or(TrustError::ChainTooDeep)?;

        // The certificate must be signed by a key trusted for `key` as of
        // its own issue date.
        if self
            .validate_signed_document_inner(&document, &Capability::key(), manifest.date, deeper)
            .await
        {
            Ok(manifest)
        } else {
            Err(TrustError::SignatureMismatch)
        }
    }

    /// Cached-key count, for diagnostics and tests.
    #[must_use]
    pub fn cached_keys(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> MutexGuard<'_, KeyCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
