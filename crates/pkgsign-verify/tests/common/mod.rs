//! Shared fixtures: key generation, signed-document authoring, and engine
//! construction against an in-memory fetcher.
#![allow(dead_code)]

use std::sync::Arc;

use pkgsign_core::canonical::canonical_encode;
use pkgsign_core::types::KeyId;
use pkgsign_crypto::keys::{generate_keypair, sign_detached};
use pkgsign_verify::{EngineConfig, MapFetch, RootKeySet, TrustEngine};
use serde_json::{json, Value};

/// A keypair with its derived key-id.
pub struct TestKey {
    pub secret: String,
    pub id: KeyId,
}

pub fn new_key() -> TestKey {
    let kp = generate_keypair();
    TestKey {
        secret: kp.secret,
        id: KeyId::from_hex(&kp.public).unwrap(),
    }
}

/// Sign `document`'s canonical encoding with each signer and attach the
/// signature set under `field`.
pub fn sign_document(document: &mut Value, field: &str, signers: &[&TestKey]) {
    let canonical = canonical_encode(document).unwrap();
    let mut set = serde_json::Map::new();
    for signer in signers {
        let sig = sign_detached(&signer.secret, &canonical).unwrap();
        set.insert(signer.id.as_hex().to_owned(), Value::String(sig));
    }
    document[field] = Value::Object(set);
}

/// Build a signed key manifest for `key`.
pub fn key_manifest(
    key: &TestKey,
    can_sign: &[&str],
    date: &str,
    valid_until: &str,
    signers: &[&TestKey],
) -> Value {
    let mut doc = json!({
        "key": key.id.as_hex(),
        "desc": "test key",
        "date": date,
        "validUntil": valid_until,
        "canSign": can_sign,
    });
    sign_document(&mut doc, "signature", signers);
    doc
}

/// Build a signed revocation list. `entries` maps key-id hex to an
/// optional `validUntil`.
pub fn revocation_list(
    serial: u64,
    date: &str,
    entries: &[(&str, Option<&str>)],
    signers: &[&TestKey],
) -> Value {
    let mut revoked = serde_json::Map::new();
    for (key_hex, valid_until) in entries {
        let entry = match valid_until {
            Some(until) => json!({ "validUntil": until }),
            None => json!({}),
        };
        revoked.insert((*key_hex).to_owned(), entry);
    }
    let mut doc = json!({
        "serial": serial,
        "date": date,
        "revoked": revoked,
    });
    sign_document(&mut doc, "signature", signers);
    doc
}

/// An engine wired to a fresh [`MapFetch`] with the given roots.
pub fn engine_with_roots(roots: &[&TestKey]) -> (Arc<TrustEngine>, Arc<MapFetch>) {
    let fetch = Arc::new(MapFetch::new());
    let root_set = RootKeySet::new(roots.iter().map(|k| k.id.clone()).collect());
    let engine = Arc::new(TrustEngine::new(
        fetch.clone(),
        EngineConfig::default(),
        root_set,
    ));
    (engine, fetch)
}

/// Serve `manifest` as the key manifest for `key`.
pub fn install_key_manifest(fetch: &MapFetch, engine: &TrustEngine, key: &TestKey, manifest: &Value) {
    fetch.insert(
        engine.config().key_manifest_url(&key.id),
        serde_json::to_vec(manifest).unwrap(),
    );
}

/// Serve an empty, root-signed revocation list so that revocation checks
/// succeed with no revocations.
pub fn install_empty_revocation(fetch: &MapFetch, engine: &TrustEngine, signer: &TestKey) {
    let list = revocation_list(1, "2024-01-01T00:00:00Z", &[], &[signer]);
    fetch.insert(
        engine.config().revocation_list_url(),
        serde_json::to_vec(&list).unwrap(),
    );
}
