//! Core domain types for the pkgsign trust chain: validated newtypes,
//! signed wire documents, and the canonical JSON encoding they are signed
//! over.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod canonical;
pub mod documents;
pub mod types;
