//! HTTP fetcher and download orchestration for pkgsign.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod download;
pub mod error;
pub mod http;

pub use download::download_artifact;
pub use error::ClientError;
pub use http::HttpFetch;
