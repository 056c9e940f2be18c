//! Admin API error classification.

use std::time::Duration;

use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors produced by calls to the backing admin API.
///
/// Everything except [`UpstreamError::Decode`] means the call could not
/// complete; see [`UpstreamError::is_unavailable`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection refused, reset, or any other transport failure.
    #[error("admin API request to {path} failed: {reason}")]
    Transport { path: String, reason: String },

    /// No complete response within the deadline.
    #[error("admin API request to {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },

    /// The admin API answered with a non-success status.
    #[error("admin API returned {status} for {path}: {snippet}")]
    Status {
        path: String,
        status: StatusCode,
        snippet: String,
    },

    /// The request could not be built (bad path or header).
    #[error("invalid admin API request for {path}: {reason}")]
    InvalidRequest { path: String, reason: String },

    /// The body did not parse into the expected shape.
    #[error("cannot decode admin API response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamError {
    /// True for every failure where the network call itself did not succeed.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, UpstreamError::Decode { .. })
    }

    /// HTTP status reported to our own clients when this error ends a request.
    pub fn gateway_status(&self) -> StatusCode {
        match self {
            UpstreamError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            UpstreamError::Transport { .. } | UpstreamError::InvalidRequest { .. } => "error",
            UpstreamError::Timeout { .. } => "timeout",
            UpstreamError::Status { .. } => "status",
            UpstreamError::Decode { .. } => "decode",
        }
    }
}

/// Parse a response body fetched from `path`. Decoding belongs to callers;
/// the client itself only returns bytes.
pub fn decode_json<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T, UpstreamError> {
    serde_json::from_slice(body).map_err(|source| UpstreamError::Decode {
        path: path.to_string(),
        source,
    })
}

/// First bytes of an error body, for logs.
pub(crate) fn snippet(body: &[u8]) -> String {
    const MAX: usize = 256;
    let text = String::from_utf8_lossy(&body[..body.len().min(MAX)]);
    text.trim().to_string()
}
