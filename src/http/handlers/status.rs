use axum::{
    extract::{OriginalUri, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::envelope::ApiError;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`: liveness only; never touches the admin API.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fallback under the API prefix: unknown calls get the error envelope.
pub async fn unknown_api(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

/// Fallback for everything outside the API. With a base path set, paths
/// outside it are sent there.
pub async fn outside_api(State(state): State<AppState>, OriginalUri(uri): OriginalUri) -> Response {
    let base_path = &state.config.server.base_path;
    let path = uri.path();
    let inside = path == base_path || path.strip_prefix(base_path.as_str()).is_some_and(|rest| rest.starts_with('/'));

    if base_path.is_empty() || inside {
        return ApiError::NotFound(path.to_string()).into_response();
    }
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, base_path.clone())]).into_response()
}
