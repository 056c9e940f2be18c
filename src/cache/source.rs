//! Cluster configuration cache and its sources.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::cache::SnapshotCache;
use crate::config::{CacheConfig, CacheSourceKind};
use crate::observability::metrics;
use crate::upstream::{decode_json, AdminApi, FetchOptions, UpstreamError};

/// Why a config load failed.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot convert {path} to JSON: {source}")]
    Convert {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Where the cluster config blob is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A JSON document served by the admin API.
    Upstream { path: String },
    /// The cluster's own TOML config file, converted to JSON.
    File { path: PathBuf },
}

impl ConfigSource {
    pub fn from_config(config: &CacheConfig) -> Self {
        match (config.source, &config.file_path) {
            (CacheSourceKind::File, Some(path)) => ConfigSource::File { path: path.into() },
            _ => ConfigSource::Upstream {
                path: config.upstream_path.clone(),
            },
        }
    }

    pub async fn load(&self, api: &dyn AdminApi) -> Result<Value, CacheError> {
        match self {
            ConfigSource::Upstream { path } => {
                let body = api.fetch(path, FetchOptions::get()).await?;
                Ok(decode_json(path, &body)?)
            }
            ConfigSource::File { path } => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CacheError::Io {
                        path: path.clone(),
                        source,
                    })?;
                let table: toml::Table = toml::from_str(&content).map_err(|source| CacheError::Toml {
                    path: path.clone(),
                    source,
                })?;
                serde_json::to_value(table).map_err(|source| CacheError::Convert {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

/// The cluster configuration, shared by every handler.
pub struct ClusterConfigCache {
    cell: SnapshotCache<Value>,
    source: ConfigSource,
    api: Arc<dyn AdminApi>,
}

impl ClusterConfigCache {
    pub fn new(source: ConfigSource, api: Arc<dyn AdminApi>) -> Self {
        Self {
            cell: SnapshotCache::new(),
            source,
            api,
        }
    }

    pub fn current(&self) -> Option<Arc<Value>> {
        self.cell.get()
    }

    /// Fetch from the source and replace the cached value.
    pub async fn reload(&self) -> Result<Arc<Value>, CacheError> {
        let result = self.cell.load(|| self.source.load(self.api.as_ref())).await;
        match &result {
            Ok(_) => {
                metrics::record_config_reload("ok");
                tracing::info!(source = ?self.source, "Cluster config loaded");
            }
            Err(e) => {
                metrics::record_config_reload("error");
                tracing::warn!(source = ?self.source, error = %e, "Cannot load cluster config");
            }
        }
        result
    }

    /// Cached value, loading it on first use.
    pub async fn get_or_load(&self) -> Result<Arc<Value>, CacheError> {
        if let Some(value) = self.current() {
            return Ok(value);
        }
        self.cell
            .get_or_load(|| async {
                let value = self.source.load(self.api.as_ref()).await;
                metrics::record_config_reload(if value.is_ok() { "ok" } else { "error" });
                value
            })
            .await
    }
}
