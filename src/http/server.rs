//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, permissive CORS)
//! - Bind server to listener
//! - Spawn the idle-client sweeper for the rate tracker
//!
//! # Design Decisions
//! - CORS is wide open by design: this is a public read-only index
//! - No request timeout layer; transfers may legitimately run long
//!   under throttling and the transport's own limits apply

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{GatewayConfig, RateLimitConfig};
use crate::fs::ServedRoot;
use crate::http::handlers;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::security::rate_limit::RateTracker;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: Arc<ServedRoot>,
    pub tracker: Arc<RateTracker>,
    pub rate_limit: RateLimitConfig,
    pub redirect_url: String,
}

/// HTTP server for the file gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    tracker: Arc<RateTracker>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails if the configured root does not exist or is not a directory;
    /// the served root is fixed for the process lifetime.
    pub fn new(config: GatewayConfig) -> std::io::Result<Self> {
        let root = Arc::new(ServedRoot::open(&config.serve.root)?);
        let tracker = Arc::new(RateTracker::new(Duration::from_secs(
            config.rate_limit.window_secs,
        )));

        tracing::info!(
            root = %root.path().display(),
            download_limit = config.rate_limit.download_limit,
            raw_limit = config.rate_limit.raw_limit,
            "Serving root opened"
        );

        let state = AppState {
            root,
            tracker: tracker.clone(),
            rate_limit: config.rate_limit.clone(),
            redirect_url: config.serve.redirect_url.clone(),
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            tracker,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/api/v1/files", get(handlers::list_files))
            .route("/api/v1/download", get(handlers::download))
            .route("/api/v1/raw", get(handlers::raw))
            .route("/", get(handlers::landing))
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .layer(CorsLayer::permissive())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        // Periodically drop client keys that have gone idle.
        let tracker = self.tracker.clone();
        let sweep_interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.tick().await; // first tick fires immediately, skip it
            loop {
                ticker.tick().await;
                tracker.sweep();
                tracing::debug!(clients = tracker.tracked_clients(), "Rate tracker swept");
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        // Serve with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return std::future::pending().await;
    }
    tracing::info!("Shutdown signal received");
}
