//! Portal Session API
//!
//! Session service backing the portal's cookie-based authentication.
//!
//! ## REST Endpoints
//!
//! - `GET /api/auth/validate` - Validate the session cookie
//! - `POST /api/auth/sync` - Mirror a client login or logout into the cookie
//! - `POST /api/auth/landing` - Resolve where the current session lands
//!
//! ## Guarded Sections
//!
//! - `GET /consumer/*` - Consumers only
//! - `GET /workspace/*` - Agents, managers and admins
//!
//! Denied requests are redirected with `303 See Other`.
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe

mod config;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use portal_auth_core::require_roles;
use portal_axum::AccessLayer;
use portal_types::RoleTag;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("session_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Portal Session API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        cookie = %config.session.cookie_name,
        signed = config.session.is_signed(),
        ttl_secs = config.session.ttl.map(|ttl| ttl.as_secs()),
        "Configuration loaded"
    );
    if !config.session.is_signed() {
        tracing::warn!("SESSION_TRUST_UNSIGNED set; session cookies are trusted as-is");
    }

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let state = AppState::new(config);
    let app = build_router(state);

    tracing::info!("HTTP server listening on {}", http_addr);
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout();

    // Session API routes
    let api = Router::new()
        .route("/auth/validate", get(handlers::validate))
        .route("/auth/sync", post(handlers::sync))
        .route("/auth/landing", post(handlers::landing));

    // Role-confined sections, each behind its own access policy
    let consumer = Router::new()
        .route("/consumer", get(handlers::consumer))
        .route("/consumer/{*rest}", get(handlers::consumer))
        .route_layer(AccessLayer::new(
            state.session.clone(),
            state.guard.clone(),
            require_roles([RoleTag::Consumer]),
        ));

    let workspace = Router::new()
        .route("/workspace", get(handlers::workspace))
        .route("/workspace/{*rest}", get(handlers::workspace))
        .route_layer(AccessLayer::new(
            state.session.clone(),
            state.guard.clone(),
            require_roles(RoleTag::WORKSPACE),
        ));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    // Combine all routes
    Router::new()
        .nest("/api", api)
        .merge(consumer)
        .merge(workspace)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
