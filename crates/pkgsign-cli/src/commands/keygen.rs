//! `pkgsign keygen` — generate a keypair and a manifest template.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use pkgsign_core::documents::{KeyManifest, SignatureSet};
use pkgsign_core::types::{Capability, KeyId};
use pkgsign_crypto::keys::generate_keypair;

/// Generate an Ed25519 keypair under `dir` as `<name>.priv` / `<name>.pub`
/// plus an unsigned manifest template `<name>.json`.
///
/// The template carries the requested capabilities and a validity window of
/// `valid_days` starting now; it still needs a parent signature
/// (`pkgsign sign-key`) before any host will trust it.
///
/// # Errors
///
/// Returns an error if a capability tag is malformed or any file cannot be
/// written.
pub fn run_keygen(dir: &Path, name: &str, desc: &str, can_sign: &[String], valid_days: i64) -> Result<()> {
    let can_sign = can_sign
        .iter()
        .map(|tag| Capability::new(tag).with_context(|| format!("capability '{tag}'")))
        .collect::<Result<Vec<_>>>()?;

    std::fs::create_dir_all(dir)?;
    let keypair = generate_keypair();

    let now = Utc::now();
    let manifest = KeyManifest {
        key: KeyId::from_hex(&keypair.public)?,
        desc: desc.to_owned(),
        date: now,
        valid_until: now + Duration::days(valid_days),
        can_sign,
        signature: SignatureSet::new(),
    };

    let priv_path = dir.join(format!("{name}.priv"));
    let pub_path = dir.join(format!("{name}.pub"));
    let manifest_path = dir.join(format!("{name}.json"));

    std::fs::write(&priv_path, format!("{}\n", keypair.secret))?;
    std::fs::write(&pub_path, format!("{}\n", keypair.public))?;
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

    println!("key-id:   {}", keypair.public);
    println!("secret:   {}", priv_path.display());
    println!("manifest: {}", manifest_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn keygen_writes_keypair_and_template() {
        let dir = tempdir().unwrap();
        run_keygen(
            dir.path(),
            "release",
            "release signing key",
            &["plugins".to_owned(), "themes".to_owned()],
            365,
        )
        .unwrap();

        let secret = std::fs::read_to_string(dir.path().join("release.priv")).unwrap();
        let public = std::fs::read_to_string(dir.path().join("release.pub")).unwrap();
        assert_eq!(secret.trim().len(), 64);
        assert_eq!(public.trim().len(), 64);

        let manifest: KeyManifest = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("release.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.key.as_hex(), public.trim());
        assert!(manifest.grants(&Capability::new("plugins").unwrap()));
        assert!(manifest.signature.is_empty());
    }

    #[test]
    fn keygen_rejects_bad_capability() {
        let dir = tempdir().unwrap();
        assert!(run_keygen(dir.path(), "k", "d", &["Not Valid".to_owned()], 1).is_err());
    }
}
