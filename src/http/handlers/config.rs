use axum::extract::State;
use serde_json::Value;

use crate::cache::CacheError;
use crate::http::envelope::{ApiError, Envelope};
use crate::http::server::AppState;

/// `GET /config`: the cached cluster config, loaded on first use.
pub async fn get_config(State(state): State<AppState>) -> Result<Envelope<Value>, ApiError> {
    let config = state
        .config_cache
        .get_or_load()
        .await
        .map_err(|e| ApiError::NotLoaded(format!("cluster config unavailable: {}", e)))?;
    Ok(Envelope::ok(Value::clone(&config)))
}

/// `POST /config/reload`: replace the cached config. On failure the previous
/// value stays in place.
pub async fn reload_config(State(state): State<AppState>) -> Result<Envelope<Value>, ApiError> {
    match state.config_cache.reload().await {
        Ok(config) => Ok(Envelope::ok(Value::clone(&config))),
        Err(CacheError::Upstream(e)) => Err(ApiError::Upstream(e)),
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}
