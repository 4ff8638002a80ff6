//! Application startup and lifecycle management.
//!
//! Startup order is fixed: connect to the store, confirm it answers a ping,
//! mark the service ready, then bind the listener. Nothing is served before the
//! store is confirmed.

use crate::config::StockConfig;
use crate::handlers;
use crate::services::{StockDb, StockStore};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Set once the store has been confirmed reachable.
#[derive(Clone, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StockStore>,
    pub readiness: Readiness,
}

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/stocks/:company", get(handlers::get_company_stocks))
        .route("/api/Stocks/:company", get(handlers::get_company_stocks))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    /// Connects to MongoDB and builds the application.
    pub async fn build(config: StockConfig) -> Result<Self, AppError> {
        let db = StockDb::connect(&config.mongodb, config.lookup.clone())
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        Self::build_with_store(config, Arc::new(db)).await
    }

    /// Builds the application around an already constructed store.
    ///
    /// Fails if the store does not answer a health check; the listener is only
    /// bound afterwards.
    pub async fn build_with_store(
        config: StockConfig,
        store: Arc<dyn StockStore>,
    ) -> Result<Self, AppError> {
        store.health_check().await.map_err(|e| {
            tracing::error!("Stock store is unreachable at startup: {}", e);
            e
        })?;

        let readiness = Readiness::new();
        readiness.mark_ready();
        tracing::info!("Stock store connection confirmed");

        let state = AppState { store, readiness };
        let router = build_router(state.clone(), config.http.request_timeout());

        // Port 0 picks a random port (tests)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Stock service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serves requests until SIGINT/SIGTERM, then drains in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
