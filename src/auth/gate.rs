//! Session gate middleware.
//!
//! # States
//! - Unauthenticated: request rejected with 401, handler never runs
//! - Authenticated: request proceeds
//!
//! # State Transitions
//! ```text
//! no credential configured        → Authenticated (gate disabled)
//! session.authenticated == true   → Authenticated
//! otherwise                       → Unauthenticated
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;

use crate::auth::cookie::{read_token, removal_cookie, session_cookie};
use crate::auth::credential::Credential;
use crate::auth::session::{SessionStore, AUTHENTICATED};
use crate::config::AuthConfig;
use crate::http::envelope::ApiError;

/// Everything the gate and the login endpoints need.
#[derive(Clone)]
pub struct SessionGate {
    credential: Option<Arc<Credential>>,
    /// A credential was configured but could not be parsed; fail closed.
    locked: bool,
    sessions: SessionStore,
    cookie_name: String,
    ttl: Duration,
    secure_cookie: bool,
}

impl SessionGate {
    pub fn new(config: &AuthConfig, sessions: SessionStore) -> Self {
        let raw = config.credential.as_deref().filter(|raw| !raw.is_empty());
        let credential = raw.and_then(Credential::parse).map(Arc::new);
        let locked = raw.is_some() && credential.is_none();
        if locked {
            tracing::error!("Configured credential is malformed; every login will fail");
        }

        Self {
            credential,
            locked,
            sessions,
            cookie_name: config.cookie_name.clone(),
            ttl: Duration::from_secs(config.session_ttl_secs),
            secure_cookie: config.secure_cookie,
        }
    }

    /// Auth is on when a credential is configured, even a malformed one.
    pub fn enabled(&self) -> bool {
        self.credential.is_some() || self.locked
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Whether a request presenting `jar` may pass.
    pub fn is_authenticated(&self, jar: &CookieJar) -> bool {
        if !self.enabled() {
            return true;
        }
        read_token(jar, &self.cookie_name)
            .and_then(|token| self.sessions.get(&token))
            .is_some_and(|session| session.is_authenticated())
    }

    /// Check the credential and open an authenticated session.
    ///
    /// Returns `jar` with the new session cookie added, or unchanged when auth
    /// is disabled. Any session the client already held is dropped first.
    pub fn login(&self, jar: CookieJar, username: &str, password: &str) -> Result<CookieJar, ApiError> {
        if !self.enabled() {
            return Ok(jar);
        }

        let verified = self
            .credential
            .as_ref()
            .is_some_and(|credential| credential.verify(username, password));
        if !verified {
            tracing::warn!(username = %username, "Rejected login");
            return Err(ApiError::InvalidCredentials);
        }

        if let Some(previous) = read_token(&jar, &self.cookie_name) {
            self.sessions.destroy(&previous);
        }
        let token = self
            .sessions
            .create([(AUTHENTICATED.to_string(), Value::Bool(true))]);
        tracing::info!(username = %username, "Login succeeded");
        Ok(jar.add(session_cookie(&self.cookie_name, &token, self.ttl, self.secure_cookie)))
    }

    /// Destroy the client's session, if any, and expire its cookie.
    pub fn logout(&self, jar: CookieJar) -> (CookieJar, bool) {
        let destroyed = read_token(&jar, &self.cookie_name)
            .map(|token| self.sessions.destroy(&token))
            .unwrap_or(false);
        (jar.remove(removal_cookie(&self.cookie_name)), destroyed)
    }
}

/// Reject unauthenticated requests before they reach the handler.
pub async fn session_gate(State(gate): State<SessionGate>, request: Request<Body>, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    if gate.is_authenticated(&jar) {
        return next.run(request).await;
    }

    tracing::debug!(path = %request.uri().path(), "Unauthenticated request rejected");
    ApiError::Unauthorized.into_response()
}
