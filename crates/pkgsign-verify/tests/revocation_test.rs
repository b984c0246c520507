//! Revocation-list semantics: fail-closed policy, the re-entrancy guard,
//! and the chosen `validUntil` comparison direction.

mod common;

use chrono::{DateTime, Utc};
use common::{
    engine_with_roots, install_empty_revocation, install_key_manifest, key_manifest, new_key,
    revocation_list,
};
use pkgsign_core::types::Capability;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn cap(tag: &str) -> Capability {
    Capability::new(tag).unwrap()
}

#[tokio::test]
async fn missing_revocation_list_fails_closed() {
    let root = new_key();
    let leaf = new_key();
    let (engine, fetch) = engine_with_roots(&[&root]);
    // No revocation list registered: the fetch will 404.

    let manifest = key_manifest(
        &leaf,
        &["core"],
        "2024-01-01T00:00:00Z",
        "2030-01-01T00:00:00Z",
        &[&root],
    );
    install_key_manifest(&fetch, &engine, &leaf, &manifest);

    // The certificate itself is fine, but with no revocation list every
    // key is treated as revoked.
    assert!(!engine.can_trust(&leaf.id, &cap("core"), Utc::now()).await);
    assert!(engine.is_revoked(&leaf.id, Utc::now()).await);
}

#[tokio::test]
async fn unsigned_revocation_list_fails_closed() {
    let root = new_key();
    let imposter = new_key();
    let leaf = new_key();
    let (engine, fetch) = engine_with_roots(&[&root]);

    // A list signed by a key nobody delegated `revoke` to.
    let list = revocation_list(1, "2024-01-01T00:00:00Z", &[], &[&imposter]);
    fetch.insert(
        engine.config().revocation_list_url(),
        serde_json::to_vec(&list).unwrap(),
    );

    let manifest = key_manifest(
        &leaf,
        &["core"],
        "2024-01-01T00:00:00Z",
        "2030-01-01T00:00:00Z",
        &[&root],
    );
    install_key_manifest(&fetch, &engine, &leaf, &manifest);

    assert!(!engine.can_trust(&leaf.id, &cap("core"), Utc::now()).await);
}

#[tokio::test]
async fn revoked_key_fails_every_capability() {
    let root = new_key();
    let leaf = new_key();
    let (engine, fetch) = engine_with_roots(&[&root]);

    let manifest = key_manifest(
        &leaf,
        &["core", "plugins"],
        "2024-01-01T00:00:00Z",
        "2030-01-01T00:00:00Z",
        &[&root],
    );
    install_key_manifest(&fetch, &engine, &leaf, &manifest);

    let list = revocation_list(
        2,
        "2024-06-01T00:00:00Z",
        &[(leaf.id.as_hex(), None)],
        &[&root],
    );
    fetch.insert(
        engine.config().revocation_list_url(),
        serde_json::to_vec(&list).unwrap(),
    );

    let at = ts("2024-07-01T00:00:00Z");
    assert!(!engine.can_trust(&leaf.id, &cap("core"), at).await);
    assert!(!engine.can_trust(&leaf.id, &cap("plugins"), at).await);
    assert!(engine.is_revoked(&leaf.id, at).await);
}

#[tokio::test]
async fn valid_until_marks_start_of_revocation() {
    // Chosen semantics: `validUntil` is when the key's validity ends —
    // not revoked strictly before it, revoked from that instant onward.
    let root = new_key();
    let leaf = new_key();
    let (engine, fetch) = engine_with_roots(&[&root]);

    let manifest = key_manifest(
        &leaf,
        &["core"],
        "2024-01-01T00:00:00Z",
        "2030-01-01T00:00:00Z",
        &[&root],
    );
    install_key_manifest(&fetch, &engine, &leaf, &manifest);

    let list = revocation_list(
        3,
        "2024-01-01T00:00:00Z",
        &[(leaf.id.as_hex(), Some("2024-06-01T00:00:00Z"))],
        &[&root],
    );
    fetch.insert(
        engine.config().revocation_list_url(),
        serde_json::to_vec(&list).unwrap(),
    );

    assert!(!engine.is_revoked(&leaf.id, ts("2024-05-31T23:59:59Z")).await);
    assert!(engine.is_revoked(&leaf.id, ts("2024-06-01T00:00:00Z")).await);

    assert!(engine.can_trust(&leaf.id, &cap("core"), ts("2024-05-01T00:00:00Z")).await);
    assert!(!engine.can_trust(&leaf.id, &cap("core"), ts("2024-07-01T00:00:00Z")).await);
}

#[tokio::test]
async fn unlisted_key_is_not_revoked() {
    let root = new_key();
    let leaf = new_key();
    let (engine, fetch) = engine_with_roots(&[&root]);
    install_empty_revocation(&fetch, &engine, &root);

    assert!(!engine.is_revoked(&leaf.id, Utc::now()).await);
}

#[tokio::test]
async fn list_is_fetched_once_per_process() {
    let root = new_key();
    let a = new_key();
    let b = new_key();
    let (engine, fetch) = engine_with_roots(&[&root]);
    install_empty_revocation(&fetch, &engine, &root);

    let now = Utc::now();
    assert!(!engine.is_revoked(&a.id, now).await);
    assert!(!engine.is_revoked(&b.id, now).await);
    assert!(!engine.is_revoked(&a.id, now).await);
    assert_eq!(fetch.hits(&engine.config().revocation_list_url()), 1);
}

#[tokio::test]
async fn invalidate_forces_refetch() {
    let root = new_key();
    let leaf = new_key();
    let (engine, fetch) = engine_with_roots(&[&root]);
    install_empty_revocation(&fetch, &engine, &root);

    let now = Utc::now();
    assert!(!engine.is_revoked(&leaf.id, now).await);

    // Re-issue the list with the leaf revoked.
    let list = revocation_list(9, "2024-01-01T00:00:00Z", &[(leaf.id.as_hex(), None)], &[&root]);
    fetch.insert(
        engine.config().revocation_list_url(),
        serde_json::to_vec(&list).unwrap(),
    );

    // Cached verdict until invalidated.
    assert!(!engine.is_revoked(&leaf.id, now).await);
    engine.invalidate_revocation_list();
    assert!(engine.is_revoked(&leaf.id, now).await);
    assert_eq!(fetch.hits(&engine.config().revocation_list_url()), 2);
}

#[tokio::test]
async fn list_signed_by_delegated_revoke_key_is_accepted() {
    // The list signer's own certificate resolution re-enters revocation
    // checking; the re-entrancy guard must break the cycle so the list
    // can be validated at all.
    let root = new_key();
    let revoker = new_key();
    let leaf = new_key();
    let (engine, fetch) = engine_with_roots(&[&root]);

    let rmanifest = key_manifest(
        &revoker,
        &["revoke"],
        "2024-01-01T00:00:00Z",
        "2030-01-01T00:00:00Z",
        &[&root],
    );
    install_key_manifest(&fetch, &engine, &revoker, &rmanifest);

    let lmanifest = key_manifest(
        &leaf,
        &["core"],
        "2024-01-01T00:00:00Z",
        "2030-01-01T00:00:00Z",
        &[&root],
    );
    install_key_manifest(&fetch, &engine, &leaf, &lmanifest);

    let list = revocation_list(
        4,
        "2024-02-01T00:00:00Z",
        &[(leaf.id.as_hex(), None)],
        &[&revoker],
    );
    fetch.insert(
        engine.config().revocation_list_url(),
        serde_json::to_vec(&list).unwrap(),
    );

    let at = ts("2024-03-01T00:00:00Z");
    assert!(engine.is_revoked(&leaf.id, at).await);
    assert!(!engine.can_trust(&leaf.id, &cap("core"), at).await);
}
