//! Signed wire documents exchanged with the key and download hosts.
//!
//! Field names are bit-exact external contracts (`key`, `desc`, `date`,
//! `validUntil`, `canSign`, `signature`, `type`, `hash`, `signatures`); do
//! not rename them without a coordinated format revision.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Capability, KeyId};

/// A signature set: signer key-id (hex) → detached Ed25519 signature (hex).
///
/// Multi-signer sets are an OR — one trusted, verifying pair is sufficient.
pub type SignatureSet = BTreeMap<String, String>;

/// A key certificate served from `<api-host>/key-manifests/<key-id>.json`.
///
/// The manifest is trusted only once its signature set validates for the
/// `key` capability as of its `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyManifest {
    /// The public key this manifest certifies. Must equal the key-id the
    /// manifest was fetched under.
    pub key: KeyId,
    /// Human-readable description of the key's purpose.
    pub desc: String,
    /// Issue timestamp; the start of the key's validity window.
    pub date: DateTime<Utc>,
    /// End of the key's validity window (inclusive).
    #[serde(rename = "validUntil")]
    pub valid_until: DateTime<Utc>,
    /// Capabilities this key is authorized to sign for.
    #[serde(rename = "canSign")]
    pub can_sign: Vec<Capability>,
    /// Signatures over the canonical encoding, from keys trusted for `key`.
    #[serde(default)]
    pub signature: SignatureSet,
}

impl KeyManifest {
    /// Return `true` if `capability` appears in this key's grant list.
    #[must_use]
    pub fn grants(&self, capability: &Capability) -> bool {
        self.can_sign.contains(capability)
    }

    /// Return `true` if `at_time` falls within `[date, validUntil]`,
    /// inclusive at both bounds.
    #[must_use]
    pub fn valid_at(&self, at_time: DateTime<Utc>) -> bool {
        at_time >= self.date && at_time <= self.valid_until
    }
}

/// The signed revocation list served from
/// `<downloads-host>/key-manifests/revocation-list.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationList {
    /// Monotonic list serial, bumped on every re-issue.
    pub serial: u64,
    /// Timestamp of this list revision.
    pub date: DateTime<Utc>,
    /// Revoked key-ids (hex) and their entries.
    #[serde(default)]
    pub revoked: BTreeMap<String, RevocationEntry>,
    /// Signatures over the canonical encoding, from keys trusted for
    /// `revoke`.
    #[serde(default)]
    pub signature: SignatureSet,
}

/// A single revocation.
///
/// `validUntil` is the end of the key's validity: the key is revoked from
/// that instant onward. An absent `validUntil` revokes the key for all
/// times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationEntry {
    /// Instant from which the revocation takes effect, if bounded below.
    #[serde(rename = "validUntil", skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
    /// Signatures authorizing this entry under `revoke`. Carried for
    /// auditing; the list's outer signature gates all entries.
    #[serde(default)]
    pub signature: SignatureSet,
}

impl RevocationEntry {
    /// Return `true` if this entry revokes the key as of `at_time`.
    #[must_use]
    pub fn revokes_at(&self, at_time: DateTime<Utc>) -> bool {
        match self.valid_until {
            Some(until) => at_time >= until,
            None => true,
        }
    }
}

/// A signed file-hash manifest served from
/// `<downloads-host>/file-manifests/<type>/<file>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileManifest {
    /// File name this manifest describes.
    pub file: String,
    /// Capability the signer must hold (`core`, `plugins`, `themes`, …).
    #[serde(rename = "type")]
    pub kind: Capability,
    /// Timestamp of the manifest.
    pub date: DateTime<Utc>,
    /// Version of the described artifact.
    pub version: String,
    /// Acceptable digests of the file, each independently signable.
    #[serde(default)]
    pub hash: Vec<HashEntry>,
    /// Signatures over the canonical encoding of the whole manifest.
    #[serde(default)]
    pub signature: SignatureSet,
}

/// One acceptable digest of a downloadable file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashEntry {
    /// Digest algorithm name (`sha256`, `sha384`, `sha512`).
    pub algorithm: String,
    /// Lowercase hex digest of the file bytes.
    pub hash: String,
    /// Timestamp the digest was signed.
    pub date: DateTime<Utc>,
    /// Signatures over the ASCII hex digest string.
    #[serde(default)]
    pub signatures: SignatureSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn key_manifest_wire_field_names() {
        let json = r#"{
            "key": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "desc": "Intermediate signing key",
            "date": "2024-01-01T00:00:00Z",
            "validUntil": "2029-01-01T00:00:00Z",
            "canSign": ["key", "plugins"],
            "signature": { "bb": "cc" }
        }"#;
        let manifest: KeyManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.key.as_hex(), "aa".repeat(32));
        assert!(manifest.grants(&Capability::key()));
        assert!(!manifest.grants(&Capability::revoke()));
        assert_eq!(manifest.signature.get("bb").unwrap(), "cc");

        let back = serde_json::to_value(&manifest).unwrap();
        assert!(back.get("validUntil").is_some());
        assert!(back.get("canSign").is_some());
    }

    #[test]
    fn validity_window_is_inclusive() {
        let manifest: KeyManifest = serde_json::from_str(&format!(
            r#"{{
                "key": "{}",
                "desc": "d",
                "date": "2024-01-01T00:00:00Z",
                "validUntil": "2025-01-01T00:00:00Z",
                "canSign": []
            }}"#,
            "ab".repeat(32)
        ))
        .unwrap();

        assert!(manifest.valid_at(ts("2024-01-01T00:00:00Z")));
        assert!(manifest.valid_at(ts("2025-01-01T00:00:00Z")));
        assert!(!manifest.valid_at(ts("2023-12-31T23:59:59Z")));
        assert!(!manifest.valid_at(ts("2025-01-01T00:00:01Z")));
    }

    #[test]
    fn revocation_entry_without_valid_until_revokes_always() {
        let entry = RevocationEntry {
            valid_until: None,
            signature: SignatureSet::new(),
        };
        assert!(entry.revokes_at(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()));
        assert!(entry.revokes_at(Utc::now()));
    }

    #[test]
    fn revocation_entry_valid_until_marks_start_of_revocation() {
        // Chosen semantics: the key is valid strictly before `validUntil`
        // and revoked from that instant onward.
        let entry = RevocationEntry {
            valid_until: Some(ts("2024-06-01T00:00:00Z")),
            signature: SignatureSet::new(),
        };
        assert!(!entry.revokes_at(ts("2024-05-31T23:59:59Z")));
        assert!(entry.revokes_at(ts("2024-06-01T00:00:00Z")));
        assert!(entry.revokes_at(ts("2024-06-02T00:00:00Z")));
    }

    #[test]
    fn file_manifest_type_field_round_trips() {
        let json = r#"{
            "file": "hello-dolly.1.6.zip",
            "type": "plugins",
            "date": "2024-03-01T00:00:00Z",
            "version": "1.6",
            "hash": [
                {
                    "algorithm": "sha384",
                    "hash": "00ff",
                    "date": "2024-03-01T00:00:00Z",
                    "signatures": {}
                }
            ],
            "signature": {}
        }"#;
        let manifest: FileManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.kind.as_str(), "plugins");
        assert_eq!(manifest.hash[0].algorithm, "sha384");

        let back = serde_json::to_value(&manifest).unwrap();
        assert_eq!(back.get("type").unwrap(), "plugins");
    }
}
