//! API middleware and shared types
//!
//! Contains:
//! - `AppState` with the shared services
//! - `ApiError` envelope used by every endpoint
//! - Admin authorization middleware (header token check)
//! - Client address extraction for rate limiting and attempt tracking

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::services::{AccessGate, ContactService, PostService, RateLimiter};

/// Header carrying the admin token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub post_service: Arc<PostService>,
    pub contact_service: Arc<ContactService>,
    pub access_gate: Arc<AccessGate>,
    pub contact_limiter: Arc<RateLimiter>,
    pub admin_token: Arc<str>,
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new("RATE_LIMITED", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "DUPLICATE_SLUG" => StatusCode::BAD_REQUEST,
            "RATE_LIMITED" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<crate::services::PostServiceError> for ApiError {
    fn from(err: crate::services::PostServiceError) -> Self {
        use crate::services::PostServiceError;
        match err {
            PostServiceError::NotFound(what) => {
                ApiError::not_found(format!("Post not found: {what}"))
            }
            PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            PostServiceError::DuplicateSlug(slug) => ApiError::with_details(
                "DUPLICATE_SLUG",
                format!("A post with slug '{slug}' already exists"),
                serde_json::json!({"field": "slug", "value": slug}),
            ),
            PostServiceError::InternalError(e) => {
                tracing::error!(error = %e, "Post operation failed");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

/// Extract the client address for rate limiting and attempt tracking.
///
/// Prefers the first `x-forwarded-for` hop so deployments behind a
/// proxy key on the real client, falling back to the socket peer.
pub fn client_address(request: &Request, fallback: Option<SocketAddr>) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    fallback
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Resolved client address, inserted by [`resolve_client_addr`]
#[derive(Debug, Clone)]
pub struct ClientAddr(pub String);

/// Middleware resolving the client address once per request
pub async fn resolve_client_addr(mut request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let addr = client_address(&request, peer);
    request.extensions_mut().insert(ClientAddr(addr));
    next.run(request).await
}

/// Admin authorization middleware
///
/// Compares the `x-admin-token` header against the configured token.
/// A missing or mismatched header yields 401 without touching state.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Admin token required"))?;

    if token != state.admin_token.as_ref() {
        return Err(ApiError::unauthorized("Invalid admin token"));
    }

    Ok(next.run(request).await)
}
