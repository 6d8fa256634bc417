//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up the request pipeline in its fixed order
//! - Guard protected routes with the access gate
//! - Spawn the idle-window sweeper
//! - Serve with graceful shutdown
//!
//! # Pipeline order (outermost first)
//! ```text
//! request id → trace → metrics → CORS → security headers → admission
//!     → timeout → body limit → router → [access gate] → handler
//! ```
//! Every stage either passes the request on or short-circuits with a
//! response; admission runs before any parsing or routing, and the access
//! gate runs only on routes marked protected.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::handlers as auth_handlers;
use crate::auth::middleware::require_auth;
use crate::auth::service::AuthService;
use crate::auth::token::TokenCodec;
use crate::config::GatewayConfig;
use crate::content::StaticSite;
use crate::http::handlers;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::security::headers::security_headers;
use crate::security::limits::body_limit_layer;
use crate::security::rate_limit::{admission_middleware, RateLimiter};
use crate::store::CredentialStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub codec: Arc<TokenCodec>,
    pub limiter: Arc<RateLimiter>,
    pub content: Arc<StaticSite>,
    pub spa_fallback: bool,
}

/// HTTP server for the request gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a new server with the given configuration and credential store.
    pub fn new(config: GatewayConfig, store: Arc<dyn CredentialStore>) -> Self {
        let codec = Arc::new(TokenCodec::new(
            config.auth.token_secret.as_bytes(),
            Duration::from_secs(config.auth.token_ttl_secs),
        ));
        let auth = Arc::new(AuthService::new(
            store,
            codec.clone(),
            Duration::from_secs(config.auth.store_timeout_secs),
        ));
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let content = Arc::new(StaticSite::new(config.content.public_dir.clone()));

        let state = AppState {
            auth,
            codec,
            limiter: limiter.clone(),
            content,
            spa_fallback: config.content.spa_fallback,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let protected = Router::new()
            .route("/dashboard", get(handlers::dashboard_page))
            .route("/api/auth/me", get(auth_handlers::me))
            .route_layer(middleware::from_fn_with_state(state.codec.clone(), require_auth));

        let public = Router::new()
            .route("/", get(handlers::index_page))
            .route("/login", get(handlers::login_page))
            .route("/register", get(handlers::register_page))
            .route("/health", get(handlers::health))
            .route("/api/auth/register", post(auth_handlers::register))
            .route("/api/auth/login", post(auth_handlers::login));

        // Innermost layers are added first; the admission check and
        // everything above it wrap the whole surface, fallback included.
        let mut router = public
            .merge(protected)
            .fallback(handlers::fallback)
            .with_state(state.clone())
            .layer(DefaultBodyLimit::disable())
            .layer(body_limit_layer(&config.security))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::from_fn_with_state(
                state.limiter.clone(),
                admission_middleware,
            ));

        if config.security.enable_headers {
            router = router.layer(middleware::from_fn(security_headers));
        }

        router
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn(metrics::track_requests))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.rate_limit.enabled {
            spawn_idle_sweeper(self.limiter.clone(), shutdown_rx.resubscribe());
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Periodically drop client windows that have gone idle.
fn spawn_idle_sweeper(limiter: Arc<RateLimiter>, mut shutdown_rx: broadcast::Receiver<()>) {
    let period = limiter.idle_ttl().max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let evicted = limiter.evict_idle(Instant::now());
                    if evicted > 0 {
                        tracing::debug!(evicted, "evicted idle client windows");
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    });
}
