//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the service objects shared by handlers (`AppState`)
//! - Create the Axum router: gated API routes, public auth routes, health,
//!   enveloped 404s under the API prefix and the base-path redirect elsewhere
//! - Wire up middleware (request ID, tracing, timeout, request metrics)
//! - Serve until the shutdown signal, running the session purge alongside

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{any, get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::aggregator::Enricher;
use crate::auth::{session_gate, SessionGate, SessionStore};
use crate::cache::{ClusterConfigCache, ConfigSource};
use crate::config::AdminConfig;
use crate::http::handlers::{self, proxy::MAX_PROXY_BODY};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;
use crate::upstream::{AdminApi, HttpAdminApi, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AdminConfig>,
    pub api: Arc<dyn AdminApi>,
    pub enricher: Arc<Enricher>,
    pub gate: SessionGate,
    pub config_cache: Arc<ClusterConfigCache>,
    pub list_retry: RetryPolicy,
}

impl AppState {
    pub fn new(config: AdminConfig, api: Arc<dyn AdminApi>) -> Self {
        let sessions = SessionStore::new(Duration::from_secs(config.auth.session_ttl_secs));
        let gate = SessionGate::new(&config.auth, sessions);
        let enricher = Arc::new(Enricher::new(Arc::clone(&api), &config.aggregator));
        let config_cache = Arc::new(ClusterConfigCache::new(
            ConfigSource::from_config(&config.cache),
            Arc::clone(&api),
        ));
        let list_retry = RetryPolicy::from_config(&config.upstream);

        Self {
            config: Arc::new(config),
            api,
            enricher,
            gate,
            config_cache,
            list_retry,
        }
    }
}

/// HTTP server for the admin front end.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server talking to the admin API configured in `config.upstream`.
    pub fn new(config: AdminConfig) -> Result<Self, UpstreamError> {
        let api = Arc::new(HttpAdminApi::new(&config.upstream)?);
        Ok(Self::with_api(config, api))
    }

    /// Create a server over any [`AdminApi`] implementation.
    pub fn with_api(config: AdminConfig, api: Arc<dyn AdminApi>) -> Self {
        let state = AppState::new(config, api);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The complete router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = Arc::clone(&state.config);

        let gated = Router::new()
            .route("/buckets", get(handlers::buckets::list_buckets))
            .route("/config", get(handlers::config::get_config))
            .route("/config/reload", post(handlers::config::reload_config))
            .route(
                "/v2/{*path}",
                any(handlers::proxy::forward).layer(DefaultBodyLimit::max(MAX_PROXY_BODY)),
            )
            .route_layer(middleware::from_fn_with_state(state.gate.clone(), session_gate));

        let public = Router::new()
            .route("/auth/login", post(handlers::auth::login))
            .route("/auth/logout", post(handlers::auth::logout))
            .route("/auth/status", get(handlers::auth::status));

        let api = gated
            .merge(public)
            .route_layer(middleware::from_fn(track_requests))
            .fallback(handlers::status::unknown_api);

        let router = Router::new()
            .nest(&config.api_prefix(), api)
            .route("/health", get(handlers::status::health))
            .fallback(handlers::status::outside_api);

        router.with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_prefix = %self.state.config.api_prefix(),
            auth_enabled = self.state.gate.enabled(),
            "HTTP server starting"
        );

        if self.state.gate.enabled() {
            let sessions = self.state.gate.sessions().clone();
            let interval = Duration::from_secs(self.state.config.auth.purge_interval_secs);
            tokio::spawn(sessions.run_purge(interval, shutdown.resubscribe()));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Record count and latency per matched route.
async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    metrics::record_request(method.as_str(), &route, response.status().as_u16(), start);
    response
}
