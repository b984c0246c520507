//! The remote-fetch collaborator contract.
//!
//! The engine never performs network I/O itself; it asks a [`Fetch`]
//! implementation for key manifests, the revocation list, detached
//! signatures, and file manifests. Implementations must bound each request
//! with a timeout; on timeout or network error the engine treats the lookup
//! as "unknown" and fails closed.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use thiserror::Error;

/// Boxed future returned by dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors a [`Fetch`] implementation may report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be completed.
    #[error("network error: {0}")]
    Network(String),
    /// The request exceeded its timeout.
    #[error("request timed out")]
    Timeout,
}

/// A completed HTTP GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers as (lowercase name, value) pairs. A header that
    /// appears multiple times appears once per value.
    pub headers: Vec<(String, String)>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Return `true` for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Return the first value of `name` (case-insensitive), if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Return the body as UTF-8 text, if it decodes.
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Performs an HTTP GET with a bounded timeout.
pub trait Fetch: Send + Sync {
    /// Fetch `url`, returning the response or a transport error.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchError>>;
}

/// Entry behavior for a URL registered with [`MapFetch`].
#[derive(Debug, Clone)]
enum MapEntry {
    Body {
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    },
    NetworkError,
}

/// An in-memory [`Fetch`] for tests and offline scenarios.
///
/// Unknown URLs resolve to a 404 response. Every call is counted per URL,
/// which lets tests assert that resolution is cached (at most one fetch per
/// unresolved key).
#[derive(Debug, Default)]
pub struct MapFetch {
    entries: Mutex<HashMap<String, MapEntry>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl MapFetch {
    /// Create an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a 200 response body for `url`.
    pub fn insert(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        lock(&self.entries).insert(
            url.into(),
            MapEntry::Body {
                headers: Vec::new(),
                body: body.into(),
            },
        );
    }

    /// Register a 200 response with headers for `url`.
    pub fn insert_with_headers(
        &self,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<Vec<u8>>,
    ) {
        lock(&self.entries).insert(
            url.into(),
            MapEntry::Body {
                headers,
                body: body.into(),
            },
        );
    }

    /// Make `url` fail with a network error.
    pub fn insert_network_error(&self, url: impl Into<String>) {
        lock(&self.entries).insert(url.into(), MapEntry::NetworkError);
    }

    /// Remove any registered behavior for `url` (it will 404 again).
    pub fn remove(&self, url: &str) {
        lock(&self.entries).remove(url);
    }

    /// Number of times `url` has been fetched.
    #[must_use]
    pub fn hits(&self, url: &str) -> usize {
        lock(&self.hits).get(url).copied().unwrap_or(0)
    }
}

impl Fetch for MapFetch {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchError>> {
        Box::pin(async move {
            *lock(&self.hits).entry(url.to_owned()).or_insert(0) += 1;
            match lock(&self.entries).get(url) {
                Some(MapEntry::Body { headers, body }) => Ok(FetchResponse {
                    status: 200,
                    headers: headers.clone(),
                    body: body.clone(),
                }),
                Some(MapEntry::NetworkError) => {
                    Err(FetchError::Network("simulated failure".to_owned()))
                }
                None => Ok(FetchResponse {
                    status: 404,
                    headers: Vec::new(),
                    body: Vec::new(),
                }),
            }
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
