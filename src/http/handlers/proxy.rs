//! Pass-through to the admin API for calls the UI makes directly.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderName, Method, Response, Uri},
};
use url::Url;

use crate::http::envelope::ApiError;
use crate::http::server::AppState;
use crate::upstream::FetchOptions;

/// Largest request body forwarded upstream.
pub const MAX_PROXY_BODY: usize = 2 * 1024 * 1024;

/// Request headers copied onto the upstream call.
const FORWARDED_HEADERS: [&str; 2] = ["content-type", "x-request-id"];

/// Prefix every forwarded call must keep after dot segments are resolved.
const FORWARDED_PREFIX: &str = "/v2/";

/// Upstream target for a request routed under `/v2/`.
///
/// The path is forwarded still percent-encoded, so `%3F` stays part of the
/// path. Targets that resolve outside `/v2/` are refused.
fn upstream_target(uri: &Uri) -> Result<String, ApiError> {
    let path = uri.path();
    let resolved = Url::parse(&format!("http://upstream{}", path))
        .map_err(|e| ApiError::BadRequest(format!("invalid path: {}", e)))?;
    if !path.starts_with(FORWARDED_PREFIX) || !resolved.path().starts_with(FORWARDED_PREFIX) {
        return Err(ApiError::BadRequest(format!("path escapes {}: {}", FORWARDED_PREFIX, path)));
    }

    Ok(match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path.to_string(),
    })
}

/// `ANY /v2/{*path}`: forward method, query and body; return the upstream
/// status and body as received.
pub async fn forward(
    State(state): State<AppState>,
    uri: Uri,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response<Body>, ApiError> {
    let target = upstream_target(&uri).inspect_err(|e| {
        tracing::warn!(path = %uri.path(), error = %e, "Refused pass-through target");
    })?;

    let mut options = FetchOptions::get().method(method);
    for name in FORWARDED_HEADERS {
        if let Some(value) = headers.get(name) {
            options.headers.insert(HeaderName::from_static(name), value.clone());
        }
    }
    if !body.is_empty() {
        options = options.body(body);
    }

    let upstream = state.api.send(&target, options).await?;
    tracing::debug!(path = %target, status = %upstream.status, "Forwarded admin API call");

    let mut builder = Response::builder().status(upstream.status);
    if let Some(content_type) = upstream.headers.get(header::CONTENT_TYPE) {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder
        .body(Body::from(upstream.body))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(uri: &str) -> Result<String, ApiError> {
        upstream_target(&uri.parse::<Uri>().unwrap())
    }

    #[test]
    fn test_target_keeps_path_and_query() {
        assert_eq!(target("/v2/GetBucketInfo?id=abc").unwrap(), "/v2/GetBucketInfo?id=abc");
        assert_eq!(target("/v2/ListBuckets?").unwrap(), "/v2/ListBuckets");
    }

    #[test]
    fn test_encoded_question_mark_stays_in_path() {
        assert_eq!(
            target("/v2/GetBucketInfo%3Fid=injected").unwrap(),
            "/v2/GetBucketInfo%3Fid=injected"
        );
    }

    #[test]
    fn test_dot_segments_cannot_leave_prefix() {
        for uri in ["/v2/%2e%2e/metrics", "/v2/%2E%2E/metrics", "/v2/../metrics", "/v2/a/../../health"] {
            assert!(matches!(target(uri), Err(ApiError::BadRequest(_))), "{}", uri);
        }
        // Dot segments that stay inside are fine.
        assert_eq!(target("/v2/a/../ListBuckets").unwrap(), "/v2/a/../ListBuckets");
    }

    #[test]
    fn test_other_prefixes_refused() {
        assert!(target("/metrics").is_err());
    }
}
