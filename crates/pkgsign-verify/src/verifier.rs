//! Signed-document and raw-signature verification.

use chrono::{DateTime, Utc};
use log::debug;
use pkgsign_core::canonical::canonical_encode;
use pkgsign_core::documents::SignatureSet;
use pkgsign_core::types::{Capability, KeyId};
use pkgsign_crypto::keys::verify_detached;
use serde_json::Value;

use crate::engine::{ChainCtx, TrustEngine};
use crate::fetch::BoxFuture;

impl TrustEngine {
    /// Validate a self-describing signed JSON document.
    ///
    /// The document is canonicalized (signature fields stripped, keys
    /// sorted) and each `(signer, signature)` pair from its signature set
    /// is tried in turn: the signer must pass [`Self::can_trust`] for
    /// `capability` at `at_time` and the signature must verify over the
    /// canonical bytes. One sufficient pair accepts the document —
    /// multi-signer sets are an OR, not an AND.
    pub async fn validate_signed_document(
        &self,
        document: &Value,
        capability: &Capability,
        at_time: DateTime<Utc>,
    ) -> bool {
        self.validate_signed_document_inner(document, capability, at_time, ChainCtx::default())
            .await
    }

    pub(crate) fn validate_signed_document_inner<'a>(
        &'a self,
        document: &'a Value,
        capability: &'a Capability,
        at_time: DateTime<Utc>,
        ctx: ChainCtx,
    ) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let Ok(canonical) = canonical_encode(document) else {
                debug!("document cannot be canonicalized");
                return false;
            };

            let signatures = document
                .get("signature")
                .or_else(|| document.get("signatures"))
                .and_then(Value::as_object);
            let Some(signatures) = signatures else {
                return false;
            };

            for (signer_hex, signature) in signatures {
                let Some(signature_hex) = signature.as_str() else {
                    continue;
                };
                if self
                    .trusted_and_verifies(signer_hex, signature_hex, &canonical, capability, at_time, ctx)
                    .await
                {
                    return true;
                }
            }
            false
        })
    }

    /// Validate caller-supplied raw bytes against a signature set.
    ///
    /// Used when the signed payload is file bytes or a digest string
    /// rather than a JSON document. Fails closed on an empty set.
    pub async fn validate_raw_signature(
        &self,
        capability: &Capability,
        at_time: DateTime<Utc>,
        data: &[u8],
        signatures: &SignatureSet,
    ) -> bool {
        self.validate_raw_signature_inner(capability, at_time, data, signatures, ChainCtx::default())
            .await
    }

    pub(crate) async fn validate_raw_signature_inner(
        &self,
        capability: &Capability,
        at_time: DateTime<Utc>,
        data: &[u8],
        signatures: &SignatureSet,
        ctx: ChainCtx,
    ) -> bool {
        for (signer_hex, signature_hex) in signatures {
            if self
                .trusted_and_verifies(signer_hex, signature_hex, data, capability, at_time, ctx)
                .await
            {
                return true;
            }
        }
        false
    }

    /// One trust-and-verify step: the signer must be trusted for the
    /// capability, then the signature must cryptographically verify.
    /// Non-hex or wrong-length encodings simply fail the step.
    async fn trusted_and_verifies(
        &self,
        signer_hex: &str,
        signature_hex: &str,
        message: &[u8],
        capability: &Capability,
        at_time: DateTime<Utc>,
        ctx: ChainCtx,
    ) -> bool {
        let Ok(signer) = KeyId::from_hex(signer_hex) else {
            debug!("skipping malformed signer key-id");
            return false;
        };
        if !self
            .can_trust_inner(&signer, capability, at_time, ctx)
            .await
        {
            return false;
        }
        match verify_detached(signer.as_hex(), message, signature_hex) {
            Ok(()) => true,
            Err(err) => {
                debug!("signature from {signer} did not verify: {err}");
                false
            }
        }
    }
}
