//! Configuration loading from disk and environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AdminConfig, CacheSourceKind, UpstreamConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Cannot read cluster config {path}: {reason}")]
    ClusterConfig { path: String, reason: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<AdminConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => AdminConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    resolve_from_cluster_config(&mut config)?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML document into a config. Missing sections take their defaults.
pub fn parse_config(content: &str) -> Result<AdminConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply the environment variables understood by the gateway.
///
/// `lookup` abstracts `std::env::var` so tests never touch process state.
pub fn apply_env_overrides<F>(config: &mut AdminConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_path) = lookup("BASE_PATH") {
        config.server.base_path = base_path.trim_end_matches('/').to_string();
    }
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port.parse().map_err(|_| {
            ConfigError::Validation(vec![ValidationError::new(
                "PORT",
                format!("'{}' is not a valid port", port),
            )])
        })?;
    }
    if let Some(credential) = lookup("AUTH_USER_PASS") {
        config.auth.credential = Some(credential).filter(|c| !c.is_empty());
    }
    if let Some(base_url) = lookup("API_BASE_URL") {
        config.upstream.base_url = base_url;
    }
    if let Some(token) = lookup("API_ADMIN_KEY") {
        config.upstream.admin_token = Some(token).filter(|t| !t.is_empty());
    }
    if let Some(cluster_config) = lookup("CONFIG_PATH") {
        config.cache.source = CacheSourceKind::File;
        config.cache.file_path = Some(cluster_config);
    }
    Ok(())
}

/// Fill unset upstream settings from the cluster's own config file, when one
/// is configured. A configured file that cannot be read or parsed is an error.
fn resolve_from_cluster_config(config: &mut AdminConfig) -> Result<(), ConfigError> {
    let Some(path) = config.cache.file_path.clone() else {
        return Ok(());
    };

    let cluster = fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|s| toml::from_str::<toml::Table>(&s).map_err(|e| e.to_string()))
        .map_err(|reason| ConfigError::ClusterConfig { path, reason })?;

    apply_cluster_admin_section(&mut config.upstream, &cluster);
    Ok(())
}

/// Use `[admin] api_bind_addr` / `admin_token` from a cluster config for any
/// upstream setting still at its default.
pub fn apply_cluster_admin_section(upstream: &mut UpstreamConfig, cluster: &toml::Table) {
    let Some(admin) = cluster.get("admin").and_then(|v| v.as_table()) else {
        return;
    };

    if upstream.base_url == UpstreamConfig::default().base_url {
        if let Some(addr) = admin.get("api_bind_addr").and_then(|v| v.as_str()) {
            if let Some(url) = bind_addr_to_url(addr) {
                upstream.base_url = url;
            }
        }
    }

    if upstream.admin_token.is_none() {
        upstream.admin_token = admin
            .get("admin_token")
            .and_then(|v| v.as_str())
            .map(str::to_string);
    }
}

/// A wildcard bind address is reachable through loopback.
fn bind_addr_to_url(addr: &str) -> Option<String> {
    let mut addr: SocketAddr = addr.parse().ok()?;
    if addr.ip().is_unspecified() {
        addr.set_ip(if addr.is_ipv4() {
            [127, 0, 0, 1].into()
        } else {
            std::net::Ipv6Addr::LOCALHOST.into()
        });
    }
    Some(format!("http://{}", addr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [server]
            port = 8000

            [aggregator]
            max_concurrency = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.aggregator.max_concurrency, 4);
        assert_eq!(config.upstream.timeout_secs, 10);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AdminConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("BASE_PATH", "/admin/"),
                ("PORT", "4000"),
                ("AUTH_USER_PASS", "admin:secret"),
                ("API_BASE_URL", "http://garage:3903"),
                ("API_ADMIN_KEY", "tok"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.base_path, "/admin");
        assert_eq!(config.api_prefix(), "/admin/api");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.auth.credential.as_deref(), Some("admin:secret"));
        assert!(config.auth.enabled());
        assert_eq!(config.upstream.base_url, "http://garage:3903");
        assert_eq!(config.upstream.admin_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_empty_credential_disables_auth() {
        let mut config = AdminConfig::default();
        apply_env_overrides(&mut config, env(&[("AUTH_USER_PASS", "")])).unwrap();
        assert!(!config.auth.enabled());
    }

    #[test]
    fn test_unparsable_port_is_rejected() {
        let mut config = AdminConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "39o9")])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors[0].field, "PORT"),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(config.server.port, AdminConfig::default().server.port);
    }

    #[test]
    fn test_unreadable_cluster_config_is_rejected() {
        let mut config = AdminConfig::default();
        apply_env_overrides(&mut config, env(&[("CONFIG_PATH", "/nonexistent/garage.toml")])).unwrap();

        let err = resolve_from_cluster_config(&mut config).unwrap_err();
        assert!(matches!(err, ConfigError::ClusterConfig { ref path, .. } if path == "/nonexistent/garage.toml"));
    }

    #[test]
    fn test_cluster_config_file_fills_upstream() {
        let path = std::env::temp_dir().join(format!("storage-admin-cluster-{}.toml", std::process::id()));
        fs::write(&path, "[admin]\napi_bind_addr = \"0.0.0.0:3903\"\nadmin_token = \"from-file\"\n").unwrap();

        let mut config = AdminConfig::default();
        config.cache.file_path = Some(path.display().to_string());
        let result = resolve_from_cluster_config(&mut config);
        fs::remove_file(&path).unwrap();

        result.unwrap();
        assert_eq!(config.upstream.base_url, "http://127.0.0.1:3903");
        assert_eq!(config.upstream.admin_token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_cluster_admin_section() {
        let cluster: toml::Table = toml::from_str(
            r#"
            metadata_dir = "/var/lib/garage/meta"

            [admin]
            api_bind_addr = "[::]:3903"
            admin_token = "cluster-token"
            "#,
        )
        .unwrap();

        let mut upstream = UpstreamConfig::default();
        apply_cluster_admin_section(&mut upstream, &cluster);
        assert_eq!(upstream.base_url, "http://[::1]:3903");
        assert_eq!(upstream.admin_token.as_deref(), Some("cluster-token"));

        // Explicit settings win.
        let mut upstream = UpstreamConfig {
            base_url: "http://10.0.0.5:3903".into(),
            admin_token: Some("mine".into()),
            ..UpstreamConfig::default()
        };
        apply_cluster_admin_section(&mut upstream, &cluster);
        assert_eq!(upstream.base_url, "http://10.0.0.5:3903");
        assert_eq!(upstream.admin_token.as_deref(), Some("mine"));
    }

    #[test]
    fn test_bind_addr_to_url() {
        assert_eq!(bind_addr_to_url("0.0.0.0:3903").as_deref(), Some("http://127.0.0.1:3903"));
        assert_eq!(bind_addr_to_url("10.1.2.3:3903").as_deref(), Some("http://10.1.2.3:3903"));
        assert_eq!(bind_addr_to_url("garbage"), None);
    }
}
