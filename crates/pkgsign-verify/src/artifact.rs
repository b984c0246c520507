//! End-to-end validation of one downloaded artifact.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use pkgsign_core::documents::{FileManifest, SignatureSet};
use pkgsign_core::types::Capability;
use pkgsign_crypto::digest::digest_hex;
use serde_json::Value;
use url::Url;

use crate::engine::TrustEngine;
use crate::error::ArtifactError;

/// A downloaded file handed over by the download orchestrator.
#[derive(Debug, Clone)]
pub struct DownloadedArtifact {
    /// Source URL the bytes were fetched from.
    pub url: String,
    /// Local path of the downloaded bytes.
    pub path: PathBuf,
    /// Capability the signer must hold for this download type
    /// (`core`, `plugins`, `themes`, …).
    pub kind: Capability,
    /// Values of any `x-content-signature` response headers, each of the
    /// form `<signer-key-hex>:<signature-hex>`.
    pub content_signatures: Vec<String>,
    /// Manifest URL advertised via a `Link: <…>; rel="manifest"` response
    /// header, if any.
    pub manifest_url: Option<String>,
}

/// How an artifact passed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// A trusted signature or signed digest covered the bytes.
    Verified,
    /// The artifact came from a host outside the allow-list; third-party
    /// sources are outside this trust system and are not checked.
    Bypassed,
}

/// Drives end-to-end validation of downloaded files against a
/// [`TrustEngine`].
pub struct ArtifactVerifier {
    engine: Arc<TrustEngine>,
}

impl ArtifactVerifier {
    /// Create a verifier sharing the given engine.
    #[must_use]
    pub fn new(engine: Arc<TrustEngine>) -> Self {
        Self { engine }
    }

    /// Verify a downloaded artifact.
    ///
    /// Decision order: host allow-list bypass, inline signature header,
    /// detached `<url>.sig`, then the file-hash manifest. On failure the
    /// local file is deleted and [`ArtifactError::SignatureFailure`] is
    /// returned — a rejected artifact must never be installed.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Io`] if the local bytes cannot be read,
    /// or [`ArtifactError::SignatureFailure`] on rejection.
    pub async fn verify(&self, artifact: &DownloadedArtifact) -> Result<VerifyOutcome, ArtifactError> {
        if !self.requires_verification(&artifact.url) {
            debug!("{} is outside the trusted hosts, skipping verification", artifact.url);
            return Ok(VerifyOutcome::Bypassed);
        }

        let bytes = std::fs::read(&artifact.path)?;
        let now = Utc::now();

        // 1. Inline signature header over the raw bytes.
        if !artifact.content_signatures.is_empty() {
            let candidates = parse_candidates(artifact.content_signatures.iter().map(String::as_str));
            if self
                .engine
                .validate_raw_signature(&artifact.kind, now, &bytes, &candidates)
                .await
            {
                info!("signature header verification of {} passed", artifact.url);
                return Ok(VerifyOutcome::Verified);
            }
            return self.reject(artifact);
        }

        // 2. Detached signature at `<url>.sig`.
        if self.detached_signature_verifies(artifact, &bytes).await {
            info!("detached signature verification of {} passed", artifact.url);
            return Ok(VerifyOutcome::Verified);
        }

        // 3. Signed file-hash manifest.
        if self.manifest_verifies(artifact, &bytes).await {
            info!("file manifest verification of {} passed", artifact.url);
            return Ok(VerifyOutcome::Verified);
        }

        self.reject(artifact)
    }

    /// Artifacts from hosts outside the allow-list (or with non-HTTP
    /// URLs) bypass verification entirely.
    fn requires_verification(&self, artifact_url: &str) -> bool {
        let Ok(parsed) = Url::parse(artifact_url) else {
            return false;
        };
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return false;
        }
        parsed
            .host_str()
            .is_some_and(|host| self.engine.config().is_trusted_host(host))
    }

    async fn detached_signature_verifies(
        &self,
        artifact: &DownloadedArtifact,
        bytes: &[u8],
    ) -> bool {
        let sig_url = format!("{}.sig", artifact.url);
        let response = match self.engine.fetcher().fetch(&sig_url).await {
            Ok(response) if response.is_success() => response,
            Ok(_) | Err(_) => {
                debug!("no detached signature at {sig_url}");
                return false;
            }
        };
        let Some(body) = response.body_str() else {
            return false;
        };
        let candidates = parse_candidates(body.lines());
        if candidates.is_empty() {
            return false;
        }
        self.engine
            .validate_raw_signature(&artifact.kind, Utc::now(), bytes, &candidates)
            .await
    }

    async fn manifest_verifies(&self, artifact: &DownloadedArtifact, bytes: &[u8]) -> bool {
        let manifest_url = artifact.manifest_url.clone().unwrap_or_else(|| {
            let file = file_name_of(&artifact.url);
            self.engine.config().file_manifest_url(&artifact.kind, &file)
        });

        let response = match self.engine.fetcher().fetch(&manifest_url).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                debug!("file manifest {manifest_url} returned status {}", response.status);
                return false;
            }
            Err(err) => {
                debug!("file manifest {manifest_url} unreachable: {err}");
                return false;
            }
        };

        let Ok(document) = serde_json::from_slice::<Value>(&response.body) else {
            return false;
        };
        let Ok(manifest) = serde_json::from_value::<FileManifest>(document.clone()) else {
            return false;
        };

        // A manifest for a different download type cannot vouch for this
        // artifact.
        if manifest.kind != artifact.kind {
            debug!(
                "file manifest {manifest_url} is for type '{}', expected '{}'",
                manifest.kind, artifact.kind
            );
            return false;
        }

        let outer_trusted = self
            .engine
            .validate_signed_document(&document, &manifest.kind, manifest.date)
            .await;

        // A digest entry counts only if the locally computed digest of the
        // downloaded bytes matches it, and the entry (or the outer
        // document) carries a trusted signature.
        for entry in &manifest.hash {
            let Some(local) = digest_hex(&entry.algorithm, bytes) else {
                debug!("unsupported digest algorithm '{}'", entry.algorithm);
                continue;
            };
            if !local.eq_ignore_ascii_case(&entry.hash) {
                continue;
            }
            if outer_trusted {
                return true;
            }
            if self
                .engine
                .validate_raw_signature(
                    &manifest.kind,
                    entry.date,
                    entry.hash.as_bytes(),
                    &entry.signatures,
                )
                .await
            {
                return true;
            }
        }
        false
    }

    /// Delete the local file and report the failure. The artifact must not
    /// be handed to the installer regardless of what the caller does next.
    fn reject(&self, artifact: &DownloadedArtifact) -> Result<VerifyOutcome, ArtifactError> {
        let file = file_name_of(&artifact.url);
        warn!("signature validation of {file} failed, deleting {}", artifact.path.display());
        if let Err(err) = std::fs::remove_file(&artifact.path) {
            warn!("could not delete rejected artifact: {err}");
        }
        Err(ArtifactError::SignatureFailure { file })
    }
}

/// Parse `<signer-key-hex>:<signature-hex>` candidates into a signature
/// set, skipping malformed values.
fn parse_candidates<'a>(values: impl Iterator<Item = &'a str>) -> SignatureSet {
    let mut set = SignatureSet::new();
    for value in values {
        let trimmed = value.trim();
        if let Some((signer, signature)) = trimmed.split_once(':') {
            if !signer.is_empty() && !signature.is_empty() {
                set.insert(signer.to_owned(), signature.to_owned());
                continue;
            }
        }
        debug!("ignoring malformed signature candidate");
    }
    set
}

/// Final path segment of a URL, used for manifest lookup and messages.
fn file_name_of(artifact_url: &str) -> String {
    let path = Url::parse(artifact_url)
        .map(|u| u.path().to_owned())
        .unwrap_or_else(|_| artifact_url.to_owned());
    path.rsplit('/').next().unwrap_or_default().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_require_signer_prefix() {
        let set = parse_candidates(["aa:bb", "no-colon", ":bb", "aa:"].into_iter());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("aa").unwrap(), "bb");
    }

    #[test]
    fn file_name_extraction() {
        assert_eq!(
            file_name_of("https://downloads.wordpress.org/plugin/hello.1.6.zip"),
            "hello.1.6.zip"
        );
        assert_eq!(file_name_of("not a url"), "not a url");
    }
}
