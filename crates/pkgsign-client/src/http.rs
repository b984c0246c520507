//! `reqwest`-backed implementation of the engine's [`Fetch`] contract.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use pkgsign_verify::{BoxFuture, Fetch, FetchError, FetchResponse};

use crate::error::ClientError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A [`Fetch`] implementation backed by a shared `reqwest` client.
///
/// Every request is bounded by the configured timeout; the engine treats a
/// timed-out lookup as unknown and fails closed.
#[derive(Debug, Clone)]
pub struct HttpFetch {
    http: Arc<reqwest::Client>,
}

impl HttpFetch {
    /// Create a fetcher with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the client cannot be built.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a fetcher with a caller-chosen per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http: Arc::new(http),
        })
    }
}

impl Fetch for HttpFetch {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchError>> {
        Box::pin(async move {
            debug!("GET {url}");
            let response = self.http.get(url).send().await.map_err(to_fetch_error)?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_owned(), v.to_owned()))
                })
                .collect();
            let body = response.bytes().await.map_err(to_fetch_error)?.to_vec();
            Ok(FetchResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn to_fetch_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}
