//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid, fan-out bound >= 1)
//! - Check the upstream URL and base path shape
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AdminConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{AdminConfig, CacheSourceKind};

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &AdminConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::new("server.port", "must be non-zero"));
    }

    let base_path = &config.server.base_path;
    if !base_path.is_empty() && (!base_path.starts_with('/') || base_path.ends_with('/')) {
        errors.push(ValidationError::new(
            "server.base_path",
            "must be empty or start with '/' and not end with '/'",
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.scheme() == "http" => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}', only http is supported", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.base_url", e.to_string())),
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be at least 1"));
    }

    if config.aggregator.max_concurrency == 0 {
        errors.push(ValidationError::new("aggregator.max_concurrency", "must be at least 1"));
    }

    if config.aggregator.deadline_secs == Some(0) {
        errors.push(ValidationError::new("aggregator.deadline_secs", "must be at least 1 when set"));
    }

    if let Some(credential) = &config.auth.credential {
        if !credential.is_empty() && !credential.contains(':') {
            errors.push(ValidationError::new("auth.credential", "expected 'user:password'"));
        }
    }

    if config.auth.session_ttl_secs == 0 {
        errors.push(ValidationError::new("auth.session_ttl_secs", "must be at least 1"));
    }

    if config.auth.purge_interval_secs == 0 {
        errors.push(ValidationError::new("auth.purge_interval_secs", "must be at least 1"));
    }

    if config.cache.source == CacheSourceKind::File && config.cache.file_path.is_none() {
        errors.push(ValidationError::new("cache.file_path", "required when cache.source = \"file\""));
    }

    if !config.cache.upstream_path.starts_with('/') {
        errors.push(ValidationError::new("cache.upstream_path", "must start with '/'"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
