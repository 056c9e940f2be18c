//! HTTP implementation of [`AdminApi`].
//!
//! # Responsibilities
//! - Resolve paths against the configured base URL
//! - Attach the admin bearer token
//! - Enforce the per-call deadline over connect, headers and body

use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::{AdminApi, FetchOptions, UpstreamError, UpstreamResponse};

/// Largest admin API body we are willing to buffer.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

const USER_AGENT: &str = concat!("storage-admin/", env!("CARGO_PKG_VERSION"));

/// Admin API client over a pooled hyper connection.
#[derive(Clone)]
pub struct HttpAdminApi {
    client: Client<HttpConnector, Body>,
    base_url: String,
    authorization: Option<HeaderValue>,
    default_timeout: Duration,
}

impl HttpAdminApi {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let invalid = |reason: String| UpstreamError::InvalidRequest {
            path: config.base_url.clone(),
            reason,
        };

        Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;

        let authorization = config
            .admin_token
            .as_deref()
            .map(|token| HeaderValue::from_str(&format!("Bearer {}", token)))
            .transpose()
            .map_err(|e| invalid(e.to_string()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorization,
            default_timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// `path` may carry its own query string; `query` pairs are appended after it.
    fn build_uri(&self, path: &str, query: &[(String, String)]) -> Result<Uri, UpstreamError> {
        let invalid = |reason: String| UpstreamError::InvalidRequest {
            path: path.to_string(),
            reason,
        };

        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| invalid(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        url.as_str().parse::<Uri>().map_err(|e| invalid(e.to_string()))
    }

    fn build_request(&self, path: &str, options: FetchOptions) -> Result<Request<Body>, UpstreamError> {
        let uri = self.build_uri(path, &options.query)?;

        let mut builder = Request::builder()
            .method(options.method)
            .uri(uri)
            .header(header::USER_AGENT, USER_AGENT);

        if let Some(headers) = builder.headers_mut() {
            headers.extend(options.headers);
            if let Some(authorization) = &self.authorization {
                headers.insert(header::AUTHORIZATION, authorization.clone());
            }
        }

        builder
            .body(options.body.map(Body::from).unwrap_or_else(Body::empty))
            .map_err(|e| UpstreamError::InvalidRequest {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn send(&self, path: &str, options: FetchOptions) -> Result<UpstreamResponse, UpstreamError> {
        let start = Instant::now();
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let request = self.build_request(path, options)?;

        let exchange = async {
            let response = self.client.request(request).await.map_err(|e| UpstreamError::Transport {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(body), MAX_BODY_BYTES)
                .await
                .map_err(|e| UpstreamError::Transport {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
            Ok::<_, UpstreamError>(UpstreamResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        };

        let result = match time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                path: path.to_string(),
                timeout,
            }),
        };

        match &result {
            Ok(response) => {
                let outcome = if response.status.is_success() { "ok" } else { "status" };
                metrics::record_upstream(outcome, start);
                tracing::debug!(path = %path, status = %response.status, elapsed = ?start.elapsed(), "Admin API call");
            }
            Err(e) => {
                metrics::record_upstream(e.outcome(), start);
                tracing::debug!(path = %path, error = %e, "Admin API call failed");
            }
        }

        result
    }
}
