//! Backing admin API client.
//!
//! # Data Flow
//! ```text
//! handler / aggregator / cache loader
//!     → AdminApi::fetch(path, FetchOptions)
//!     → client.rs (build URI, inject bearer token, enforce timeout)
//!     → admin API
//!     → raw body bytes | UpstreamError
//! ```
//!
//! # Design Decisions
//! - No retries here; retry policy belongs to the caller
//! - Decoding belongs to the caller (`decode_json`)
//! - Trait seam so handlers and the aggregator run against fakes in tests

pub mod client;
pub mod error;

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};

pub use client::HttpAdminApi;
pub use error::{decode_json, UpstreamError};

/// Per-call options. `Default` is a plain GET with the client's default timeout.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub method: Method,
    /// Appended to the path as percent-encoded query parameters.
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
    /// Extra request headers (content type, request id).
    pub headers: HeaderMap,
    /// Overrides the client-wide default timeout.
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A complete admin API response, whatever its status.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Body of a 2xx response; any other status is classified as unavailable.
    pub fn into_success_body(self, path: &str) -> Result<Bytes, UpstreamError> {
        if self.status.is_success() {
            Ok(self.body)
        } else {
            Err(UpstreamError::Status {
                path: path.to_string(),
                status: self.status,
                snippet: error::snippet(&self.body),
            })
        }
    }
}

/// The backing admin API.
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Perform one request and return the response as received.
    ///
    /// Fails only when no complete response was obtained.
    async fn send(&self, path: &str, options: FetchOptions) -> Result<UpstreamResponse, UpstreamError>;

    /// Perform one request and return its body, treating non-2xx as unavailable.
    async fn fetch(&self, path: &str, options: FetchOptions) -> Result<Bytes, UpstreamError> {
        self.send(path, options).await?.into_success_body(path)
    }
}
