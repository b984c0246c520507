//! Trust chain & signature verification engine.
//!
//! The entry points are [`TrustEngine`] (key trust resolution, revocation,
//! signed-document and raw-signature verification) and [`ArtifactVerifier`]
//! (end-to-end validation of a downloaded file). All remote lookups go
//! through the [`Fetch`] collaborator; every internal failure resolves to
//! "not trusted" rather than an error surfaced to the caller.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod artifact;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod revocation;
pub mod roots;
mod verifier;

pub use artifact::{ArtifactVerifier, DownloadedArtifact, VerifyOutcome};
pub use config::EngineConfig;
pub use engine::TrustEngine;
pub use error::ArtifactError;
pub use fetch::{BoxFuture, Fetch, FetchError, FetchResponse, MapFetch};
pub use roots::RootKeySet;
