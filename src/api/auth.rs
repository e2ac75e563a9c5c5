//! Access verification API endpoint
//!
//! Handles HTTP requests for the protected reading area:
//! - POST /api/auth/verify - Check a submitted access code

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, ClientAddr};
use crate::services::AccessOutcome;

/// Request body for access verification
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub code: String,
}

/// Success response for access verification
#[derive(Debug, Serialize)]
pub struct VerifySuccess {
    pub message: String,
}

/// Failure response carrying attempt bookkeeping
#[derive(Debug, Serialize)]
pub struct VerifyFailure {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<i64>,
}

/// Build the auth router
pub fn router() -> Router<AppState> {
    Router::new().route("/verify", post(verify_access))
}

/// POST /api/auth/verify - Check a submitted access code
///
/// An empty or missing code is rejected up front without consuming an
/// attempt. A locked-out client gets 429 regardless of the code.
pub async fn verify_access(
    State(state): State<AppState>,
    Extension(client): Extension<ClientAddr>,
    Json(body): Json<VerifyRequest>,
) -> Result<Response, ApiError> {
    let code = body.code.trim();
    if code.is_empty() {
        return Err(ApiError::validation_error("Access code is required"));
    }

    let response = match state.access_gate.verify(&client.0, code).await {
        AccessOutcome::Granted => (
            StatusCode::OK,
            Json(VerifySuccess {
                message: "Access granted".to_string(),
            }),
        )
            .into_response(),
        AccessOutcome::Denied { remaining } => {
            tracing::warn!(client = %client.0, remaining, "Access code rejected");
            (
                StatusCode::UNAUTHORIZED,
                Json(VerifyFailure {
                    error: "Invalid access code".to_string(),
                    remaining_attempts: Some(remaining),
                    locked: None,
                    retry_after_secs: None,
                }),
            )
                .into_response()
        }
        AccessOutcome::LockedOut { retry_after_secs } => {
            tracing::warn!(client = %client.0, retry_after_secs, "Access locked out");
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(VerifyFailure {
                    error: "Too many failed attempts. Try again later.".to_string(),
                    remaining_attempts: None,
                    locked: Some(true),
                    retry_after_secs: Some(retry_after_secs),
                }),
            )
                .into_response()
        }
    };

    Ok(response)
}
