//! Cryptographic primitives for pkgsign: hex-encoded Ed25519 keys,
//! detached signatures, and file digests.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod digest;
pub mod error;
pub mod keys;
