//! Login, logout and session status.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::http::envelope::{ApiError, Envelope};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub enabled: bool,
    pub authenticated: bool,
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Envelope<AuthStatus>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let jar = state.gate.login(jar, &request.username, &request.password)?;

    Ok((
        jar,
        Envelope::ok(AuthStatus {
            enabled: state.gate.enabled(),
            authenticated: true,
        }),
    ))
}

/// `POST /auth/logout`
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Envelope<AuthStatus>) {
    let (jar, destroyed) = state.gate.logout(jar);
    if destroyed {
        tracing::info!("Session closed");
    }

    (
        jar,
        Envelope::ok(AuthStatus {
            enabled: state.gate.enabled(),
            authenticated: !state.gate.enabled(),
        }),
    )
}

/// `GET /auth/status`
pub async fn status(State(state): State<AppState>, jar: CookieJar) -> Envelope<AuthStatus> {
    Envelope::ok(AuthStatus {
        enabled: state.gate.enabled(),
        authenticated: state.gate.is_authenticated(&jar),
    })
}
