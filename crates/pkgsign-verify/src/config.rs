//! Engine configuration: manifest hosts, the distribution allow-list, and
//! the chain depth limit.

use pkgsign_core::types::{Capability, KeyId};

/// Configuration for a [`crate::TrustEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the API host serving key manifests.
    pub api_base: String,
    /// Base URL of the downloads host serving the revocation list and file
    /// manifests.
    pub downloads_base: String,
    /// Hosts whose artifacts are subject to signature verification.
    /// Artifacts from any other host bypass verification entirely.
    pub trusted_hosts: Vec<String>,
    /// Maximum certificate-chain depth before resolution fails closed.
    pub max_chain_depth: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.wordpress.org".to_owned(),
            downloads_base: "https://downloads.wordpress.org".to_owned(),
            trusted_hosts: vec![
                "wordpress.org".to_owned(),
                "downloads.wordpress.org".to_owned(),
                "s.w.org".to_owned(),
            ],
            max_chain_depth: 8,
        }
    }
}

impl EngineConfig {
    /// URL of the key manifest for `key`.
    #[must_use]
    pub fn key_manifest_url(&self, key: &KeyId) -> String {
        format!("{}/key-manifests/{}.json", self.api_base, key.as_hex())
    }

    /// URL of the revocation list.
    #[must_use]
    pub fn revocation_list_url(&self) -> String {
        format!("{}/key-manifests/revocation-list.json", self.downloads_base)
    }

    /// URL of the file-hash manifest for `file` of the given type.
    #[must_use]
    pub fn file_manifest_url(&self, kind: &Capability, file: &str) -> String {
        format!(
            "{}/file-manifests/{}/{}.json",
            self.downloads_base,
            kind.as_str(),
            file
        )
    }

    /// Return `true` if `host` is on the trusted-distribution allow-list.
    #[must_use]
    pub fn is_trusted_host(&self, host: &str) -> bool {
        self.trusted_hosts.iter().any(|h| h == host)
    }
}
