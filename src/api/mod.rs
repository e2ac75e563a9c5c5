//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP API endpoints for the blog backend:
//! - Post API endpoints (public reads, admin mutations)
//! - Access verification endpoint
//! - Contact form and admin inbox endpoints
//! - Health check

pub mod auth;
pub mod contact;
pub mod middleware;
pub mod posts;

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, ADMIN_TOKEN_HEADER};

/// GET /api/health - Liveness check including a database ping
async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.pool.ping().await.map_err(|e| {
        tracing::error!(error = %e, "Health check database ping failed");
        ApiError::internal_error("Service unhealthy")
    })?;

    Ok(Json(serde_json::json!({"status": "ok"})))
}

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need the admin token header)
    let admin_routes = Router::new()
        .nest("/blog", posts::protected_router())
        .nest("/messages", contact::admin_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_admin,
        ));

    // Public routes
    Router::new()
        .route("/health", get(health))
        .nest("/blog", posts::public_router())
        .nest("/auth", auth::router())
        .nest("/contact", contact::public_router())
        .merge(admin_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .context("Invalid CORS origin")?,
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(ADMIN_TOKEN_HEADER),
        ]);

    Ok(Router::new()
        .nest("/api", build_api_router(state.clone()))
        .layer(axum_middleware::from_fn(middleware::resolve_client_addr))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
