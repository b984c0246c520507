//! `pkgsign sign-file` — write a detached signature for an arbitrary file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pkgsign_crypto::keys::{public_from_secret, sign_detached};

use super::read_secret;

/// Sign the raw bytes of `file` and write `<file>.sig` next to it.
///
/// The `.sig` body is one `<signer-key-hex>:<signature-hex>` line, the
/// form the verifier accepts both inline and detached.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the key is malformed, or
/// the signature file cannot be written.
pub fn run_sign_file(file: &Path, signing_key_path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let secret = read_secret(signing_key_path)?;
    let signer = public_from_secret(&secret)?;
    let signature = sign_detached(&secret, &bytes)?;

    let sig_path = sig_path_for(file);
    std::fs::write(&sig_path, format!("{signer}:{signature}\n"))?;
    println!("wrote {}", sig_path.display());
    Ok(())
}

/// `<file>.sig`, appended to the full file name rather than replacing the
/// extension.
fn sig_path_for(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".sig");
    PathBuf::from(name)
}
