//! Revocation-list fetching, validation, and lookup.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use pkgsign_core::documents::RevocationList;
use pkgsign_core::types::{Capability, KeyId};
use serde_json::Value;

use crate::engine::{ChainCtx, TrustEngine};
use crate::fetch::BoxFuture;

/// Cached revocation-list state, fetched at most once per process unless
/// explicitly invalidated.
#[derive(Debug)]
pub(crate) enum RevocationState {
    /// Not yet fetched.
    NotFetched,
    /// Fetched and outer signature validated for `revoke`.
    Trusted(RevocationList),
    /// Fetch or outer-signature validation failed. Conservative policy:
    /// every lookup answers "revoked" until the list is invalidated.
    Untrusted,
}

impl TrustEngine {
    /// Report whether `key` is revoked as of `at_time`.
    ///
    /// Fail-closed: if the list cannot be fetched or its signature does
    /// not validate, every key is reported revoked.
    pub async fn is_revoked(&self, key: &KeyId, at_time: DateTime<Utc>) -> bool {
        self.is_revoked_inner(key, at_time, ChainCtx::default())
            .await
    }

    pub(crate) fn is_revoked_inner<'a>(
        &'a self,
        key: &'a KeyId,
        at_time: DateTime<Utc>,
        ctx: ChainCtx,
    ) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            // Validating the list's own signature re-enters trust
            // resolution; a key actively being used to validate the list
            // cannot simultaneously be revoked by it.
            if ctx.in_revocation_check {
                return false;
            }

            if let Some(answer) = self.lookup_cached(key, at_time) {
                return answer;
            }

            let state = self.load_revocation_list(ctx).await;
            let answer = match &state {
                RevocationState::Trusted(list) => entry_revokes(list, key, at_time),
                _ => true,
            };

            // Last-writer-wins: concurrent loads derive the same list.
            *self.lock_revocation() = state;
            answer
        })
    }

    /// Drop the cached list so the next lookup re-fetches it.
    pub fn invalidate_revocation_list(&self) {
        *self.lock_revocation() = RevocationState::NotFetched;
    }

    fn lookup_cached(&self, key: &KeyId, at_time: DateTime<Utc>) -> Option<bool> {
        match &*self.lock_revocation() {
            RevocationState::NotFetched => None,
            RevocationState::Untrusted => Some(true),
            RevocationState::Trusted(list) => Some(entry_revokes(list, key, at_time)),
        }
    }

    async fn load_revocation_list(&self, ctx: ChainCtx) -> RevocationState {
        let url = self.config().revocation_list_url();
        let response = match self.fetcher().fetch(&url).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                warn!("revocation list {url} returned status {}", response.status);
                return RevocationState::Untrusted;
            }
            Err(err) => {
                warn!("revocation list {url} unreachable: {err}");
                return RevocationState::Untrusted;
            }
        };

        let Ok(document) = serde_json::from_slice::<Value>(&response.body) else {
            warn!("revocation list {url} is not valid JSON");
            return RevocationState::Untrusted;
        };
        let Ok(list) = serde_json::from_value::<RevocationList>(document.clone()) else {
            warn!("revocation list {url} has an unexpected shape");
            return RevocationState::Untrusted;
        };

        // The list's own signature must be valid for `revoke` before any
        // entry is trusted. The guard suppresses nested revocation checks
        // for the duration of this validation pass.
        let guarded = ctx.with_revocation_guard();
        if self
            .validate_signed_document_inner(&document, &Capability::revoke(), list.date, guarded)
            .await
        {
            debug!("revocation list serial {} accepted", list.serial);
            RevocationState::Trusted(list)
        } else {
            warn!("revocation list {url} failed outer signature validation");
            RevocationState::Untrusted
        }
    }

    fn lock_revocation(&self) -> std::sync::MutexGuard<'_, RevocationState> {
        self.revocation
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn entry_revokes(list: &RevocationList, key: &KeyId, at_time: DateTime<Utc>) -> bool {
    list.revoked
        .get(key.as_hex())
        .is_some_and(|entry| entry.revokes_at(at_time))
}
