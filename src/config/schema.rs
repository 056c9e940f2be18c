//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the admin gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the admin gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Listener configuration (host, port, base path).
    pub server: ServerConfig,

    /// Backing admin API settings.
    pub upstream: UpstreamConfig,

    /// Bucket enrichment fan-out settings.
    pub aggregator: AggregatorConfig,

    /// Session gate settings.
    pub auth: AuthConfig,

    /// Cluster config cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl AdminConfig {
    /// Prefix under which every API route is mounted (`{base_path}/api`).
    pub fn api_prefix(&self) -> String {
        format!("{}/api", self.server.base_path)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port to bind.
    pub port: u16,

    /// Path prefix the UI and API are served under (e.g. "/admin"). Empty for root.
    pub base_path: String,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3909,
            base_path: String::new(),
        }
    }
}

/// Backing admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the admin API (e.g., "http://127.0.0.1:3903").
    pub base_url: String,

    /// Bearer token sent with every upstream call.
    pub admin_token: Option<String>,

    /// Default per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Extra attempts for the bucket list call when the upstream is unavailable.
    pub list_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub retry_base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub retry_max_delay_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3903".to_string(),
            admin_token: None,
            timeout_secs: 10,
            list_retries: 1,
            retry_base_delay_ms: 100,
            retry_max_delay_ms: 2000,
        }
    }
}

/// Enrichment fan-out configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Maximum detail fetches in flight for a single list call.
    pub max_concurrency: usize,

    /// Overall deadline for one enrichment in seconds. Records still pending
    /// when it expires are returned in degraded form.
    pub deadline_secs: Option<u64>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
            deadline_secs: None,
        }
    }
}

/// Session gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// `user:password` or `user:<argon2 PHC hash>`. Auth is disabled when unset.
    pub credential: Option<String>,

    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,

    /// Name of the session cookie.
    pub cookie_name: String,

    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,

    /// Interval between expired-session sweeps in seconds.
    pub purge_interval_secs: u64,
}

impl AuthConfig {
    pub fn enabled(&self) -> bool {
        self.credential.as_deref().is_some_and(|c| !c.is_empty())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credential: None,
            session_ttl_secs: 24 * 3600,
            cookie_name: "storage_admin_session".to_string(),
            secure_cookie: false,
            purge_interval_secs: 300,
        }
    }
}

/// Where the cluster config blob comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSourceKind {
    /// Fetched from the admin API.
    Upstream,
    /// Read from the cluster's TOML config file.
    File,
}

/// Cluster config cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub source: CacheSourceKind,

    /// Admin API path fetched when `source = "upstream"`.
    pub upstream_path: String,

    /// Cluster config file read when `source = "file"`.
    pub file_path: Option<String>,

    /// Populate the cache before accepting traffic.
    pub load_on_startup: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            source: CacheSourceKind::Upstream,
            upstream_path: "/v2/GetClusterStatus".to_string(),
            file_path: None,
            load_on_startup: true,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
