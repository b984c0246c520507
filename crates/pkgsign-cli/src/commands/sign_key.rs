//! `pkgsign sign-key` — countersign a key manifest with a parent key.

use std::path::Path;

use anyhow::{Context, Result};
use pkgsign_core::canonical::canonical_encode;
use pkgsign_crypto::keys::{public_from_secret, sign_detached};
use serde_json::Value;

use super::read_secret;

/// Sign the manifest's canonical encoding with the parent key and append
/// the signature to its `signature` map in place.
///
/// Existing signatures from other parents are kept; re-signing with the
/// same parent replaces that parent's entry.
///
/// # Errors
///
/// Returns an error if the manifest is not a JSON object or any I/O or
/// signing step fails.
pub fn run_sign_key(manifest_path: &Path, parent_key_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("reading manifest {}", manifest_path.display()))?;
    let mut manifest: Value = serde_json::from_str(&raw)?;
    anyhow::ensure!(manifest.is_object(), "manifest is not a JSON object");

    let secret = read_secret(parent_key_path)?;
    let signer = public_from_secret(&secret)?;

    let canonical = canonical_encode(&manifest)?;
    let signature = sign_detached(&secret, &canonical)?;

    let signatures = manifest
        .as_object_mut()
        .and_then(|object| {
            object
                .entry("signature")
                .or_insert_with(|| Value::Object(serde_json::Map::new()))
                .as_object_mut()
        })
        .context("manifest 'signature' field is not an object")?;
    signatures.insert(signer.clone(), Value::String(signature));

    std::fs::write(manifest_path, serde_json::to_string_pretty(&manifest)?)?;
    println!("signed {} as {signer}", manifest_path.display());
    Ok(())
}
