//! CLI configuration — read/write `~/.pkgsign/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Persisted CLI configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the API host serving key manifests.
    pub api_base: String,
    /// Base URL of the downloads host serving the revocation list and
    /// file manifests.
    pub downloads_base: String,
    /// Directory holding locally generated signing keys.
    pub key_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_owned());
        Self {
            api_base: "https://api.wordpress.org".to_owned(),
            downloads_base: "https://downloads.wordpress.org".to_owned(),
            key_dir: PathBuf::from(home).join(".pkgsign").join("keys"),
        }
    }
}

/// Return the default path for the CLI config file (`~/.pkgsign/config.toml`).
#[must_use]
pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_owned());
    PathBuf::from(home).join(".pkgsign").join("config.toml")
}

/// Load a [`CliConfig`] from `path`, or defaults if the file is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or deserialized.
pub fn load_config(path: &Path) -> Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

/// Write `cfg` to `path`, creating parent directories if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn save_config(cfg: &CliConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string(cfg)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = CliConfig {
            api_base: "https://api.example.org".to_owned(),
            downloads_base: "https://dl.example.org".to_owned(),
            key_dir: dir.path().join("keys"),
        };
        save_config(&cfg, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.api_base, "https://api.example.org");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let loaded = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.api_base, "https://api.wordpress.org");
    }
}
