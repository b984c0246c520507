//! CLI subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};

pub mod keygen;
pub mod revoke;
pub mod sign_file;
pub mod sign_key;
pub mod verify;

/// Read a hex secret key from a `.priv` file, trimming whitespace.
pub(crate) fn read_secret(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading signing key {}", path.display()))?;
    Ok(raw.trim().to_owned())
}
