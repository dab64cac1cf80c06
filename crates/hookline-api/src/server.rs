//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID generation
//! 2. Request/response tracing
//! 3. Timeout enforcement
//! 4. Handler execution
//!
//! # Graceful Shutdown
//!
//! On SIGTERM or Ctrl-C the server stops accepting connections and lets
//! in-flight requests finish before `start_server` returns.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use hookline_core::{Clock, EventStore, RealClock, FEED_LIMIT};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{handlers, Config};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state handed to every handler.
///
/// Built once at startup; the store handle inside is reused by all requests.
#[derive(Clone)]
pub struct AppState {
    /// Event store gateway
    pub store: Arc<dyn EventStore>,
    /// Time source for stamping received events
    pub clock: Arc<dyn Clock>,
    /// Rows fetched by the feed endpoint
    pub events_limit: usize,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl AppState {
    /// Creates state with default feed limit and timeout.
    pub fn new(store: Arc<dyn EventStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, events_limit: FEED_LIMIT, request_timeout: DEFAULT_REQUEST_TIMEOUT }
    }

    /// Creates state using the wall clock and limits from configuration.
    pub fn from_config(store: Arc<dyn EventStore>, config: &Config) -> Self {
        Self {
            store,
            clock: Arc::new(RealClock::new()),
            events_limit: config.events_limit,
            request_timeout: config.request_timeout(),
        }
    }
}

/// Creates the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use hookline_api::{create_router, AppState};
/// use hookline_core::{store::mock::InMemoryEventStore, RealClock};
///
/// let state = AppState::new(Arc::new(InMemoryEventStore::new()), Arc::new(RealClock::new()));
/// let app = create_router(state);
/// ```
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/live", get(handlers::liveness_check));

    let app_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/webhook", post(handlers::receive_webhook))
        .route("/api/events", get(handlers::list_events))
        .route("/api/clear", get(handlers::clear_events));

    let request_timeout = state.request_timeout;

    Router::new()
        .merge(health_routes)
        .merge(app_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

/// Middleware to inject request ID into all responses.
async fn inject_request_id(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();

    let mut req = req;
    req.extensions_mut().insert(request_id.clone());

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert("X-Request-Id", header_value);
    }

    response
}

/// Starts the HTTP server with graceful shutdown support.
///
/// # Errors
///
/// Returns `std::io::Error` if the address cannot be bound or serving fails.
pub async fn start_server(state: AppState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("HTTP server listening on {}", actual_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight requests to complete");
}
