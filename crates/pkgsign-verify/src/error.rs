//! Failure taxonomy for trust decisions and artifact verification.
//!
//! Inside the engine, every one of these reasons collapses to a boolean
//! "not trusted" at the public boundary; the granular variant is logged for
//! diagnostics and must never be used to selectively bypass verification.

use thiserror::Error;

/// Why a key or document failed a trust check.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrustError {
    /// The document is unparseable or not a JSON object.
    #[error("malformed document")]
    MalformedDocument,
    /// No resolvable, validly signed certificate exists for the key.
    #[error("unknown key")]
    UnknownKey,
    /// The key's validity window has ended.
    #[error("key expired")]
    ExpiredKey,
    /// The key's validity window has not started.
    #[error("key not yet valid")]
    NotYetValid,
    /// The key appears in the revocation list as of the query time.
    #[error("key revoked")]
    RevokedKey,
    /// The key is valid but lacks the required capability.
    #[error("capability denied")]
    CapabilityDenied,
    /// Cryptographic verification failed for every candidate signature.
    #[error("signature mismatch")]
    SignatureMismatch,
    /// A remote lookup failed; the key stays unknown for this process.
    #[error("fetch failure")]
    FetchFailure,
    /// The certificate chain exceeded the configured depth limit.
    #[error("certificate chain too deep")]
    ChainTooDeep,
}

/// Errors surfaced by the artifact verifier.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// No acceptable signature was found; the local file has been deleted
    /// and the artifact must not be installed.
    #[error("signature validation of {file} failed")]
    SignatureFailure {
        /// File name of the rejected artifact.
        file: String,
    },
    /// The artifact file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
