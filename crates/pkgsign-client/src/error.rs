//! Client error types.

use pkgsign_verify::FetchError;
use thiserror::Error;

/// Errors from HTTP client construction and artifact downloads.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    /// A fetch failed at the transport level.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The server answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// HTTP status code of the response.
        status: u16,
    },
    /// The URL could not be parsed or has no usable file name.
    #[error("invalid download url: {0}")]
    InvalidUrl(String),
    /// The downloaded bytes could not be written to disk.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
