//! `pkgsign revoke` — add a key to the revocation list and re-sign it.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pkgsign_core::canonical::canonical_encode;
use pkgsign_core::documents::{RevocationEntry, RevocationList, SignatureSet};
use pkgsign_core::types::KeyId;
use pkgsign_crypto::keys::{public_from_secret, sign_detached};

use super::read_secret;

/// Add `key_hex` to the revocation list at `list_path`, bump the serial,
/// and re-sign the list with the given `revoke`-capable key.
///
/// A missing list file starts a fresh list at serial 1. Earlier signatures
/// are dropped; they covered the previous serial and no longer verify.
///
/// # Errors
///
/// Returns an error if the key-id is malformed, the existing list cannot
/// be parsed, or any I/O or signing step fails.
pub fn run_revoke(
    list_path: &Path,
    key_hex: &str,
    valid_until: Option<DateTime<Utc>>,
    signing_key_path: &Path,
) -> Result<()> {
    let key = KeyId::from_hex(key_hex).context("revoked key-id")?;

    let mut list = if list_path.exists() {
        let raw = std::fs::read_to_string(list_path)?;
        serde_json::from_str::<RevocationList>(&raw)
            .with_context(|| format!("parsing {}", list_path.display()))?
    } else {
        RevocationList {
            serial: 0,
            date: Utc::now(),
            revoked: std::collections::BTreeMap::new(),
            signature: SignatureSet::new(),
        }
    };

    list.serial += 1;
    list.date = Utc::now();
    list.revoked.insert(
        key.as_hex().to_owned(),
        RevocationEntry {
            valid_until,
            signature: SignatureSet::new(),
        },
    );
    list.signature.clear();

    let secret = read_secret(signing_key_path)?;
    let signer = public_from_secret(&secret)?;
    let document = serde_json::to_value(&list)?;
    let canonical = canonical_encode(&document)?;
    let signature = sign_detached(&secret, &canonical)?;
    list.signature.insert(signer, signature);

    std::fs::write(list_path, serde_json::to_string_pretty(&list)?)?;
    println!(
        "revoked {} in {} (serial {})",
        key.as_hex(),
        list_path.display(),
        list.serial
    );
    Ok(())
}
