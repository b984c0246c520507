//! Hex-encoded Ed25519 keypairs and detached signatures.
//!
//! Keys and signatures travel as lowercase hex on the wire and in local
//! key files; the helpers here decode, verify, and produce that format.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::CryptoError;

/// A freshly generated Ed25519 keypair, both halves hex-encoded.
#[derive(Debug, Clone)]
pub struct HexKeypair {
    /// 64-hex-character secret seed.
    pub secret: String,
    /// 64-hex-character public key; doubles as the key-id.
    pub public: String,
}

/// Generate a new Ed25519 keypair.
#[must_use]
pub fn generate_keypair() -> HexKeypair {
    let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
    HexKeypair {
        secret: hex::encode(signing_key.to_bytes()),
        public: hex::encode(signing_key.verifying_key().to_bytes()),
    }
}

/// Derive the hex public key from a hex secret seed.
///
/// # Errors
///
/// Returns [`CryptoError`] if the seed is not 32 hex-decodable bytes.
pub fn public_from_secret(secret_hex: &str) -> Result<String, CryptoError> {
    let signing_key = decode_signing_key(secret_hex)?;
    Ok(hex::encode(signing_key.verifying_key().to_bytes()))
}

/// Sign `message` with a hex secret seed, returning the hex signature.
///
/// # Errors
///
/// Returns [`CryptoError`] if the seed is invalid.
pub fn sign_detached(secret_hex: &str, message: &[u8]) -> Result<String, CryptoError> {
    let signing_key = decode_signing_key(secret_hex)?;
    Ok(hex::encode(signing_key.sign(message).to_bytes()))
}

/// Verify a detached hex signature over `message` with a hex public key.
///
/// # Errors
///
/// Returns [`CryptoError`] describing which decoding or verification step
/// failed. Callers that only need a trust decision should map any error to
/// "not trusted".
pub fn verify_detached(
    public_hex: &str,
    message: &[u8],
    signature_hex: &str,
) -> Result<(), CryptoError> {
    let key_bytes: [u8; 32] = hex::decode(public_hex)
        .map_err(|_| CryptoError::InvalidHex)?
        .try_into()
        .map_err(|_| CryptoError::InvalidKey)?;
    let verifying_key =
        VerifyingKey::from_bytes(&key_bytes).map_err(|_| CryptoError::InvalidKey)?;

    let sig_bytes = hex::decode(signature_hex).map_err(|_| CryptoError::InvalidHex)?;
    if sig_bytes.len() != 64 {
        return Err(CryptoError::InvalidSignatureLength(sig_bytes.len()));
    }
    let signature =
        Signature::from_slice(&sig_bytes).map_err(|_| CryptoError::SignatureMismatch)?;

    verifying_key
        .verify(message, &signature)
        .map_err(|_| CryptoError::SignatureMismatch)
}

fn decode_signing_key(secret_hex: &str) -> Result<SigningKey, CryptoError> {
    let seed: [u8; 32] = hex::decode(secret_hex)
        .map_err(|_| CryptoError::InvalidHex)?
        .try_into()
        .map_err(|_| CryptoError::InvalidKey)?;
    Ok(SigningKey::from_bytes(&seed))
}
