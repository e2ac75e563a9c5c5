//! Contact API endpoints
//!
//! Handles HTTP requests for the contact form:
//! - POST /api/contact - Submit a contact message (rate limited)
//! - GET /api/messages - List recent messages (admin)

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, ClientAddr};
use crate::models::{ContactMessage, NewMessageInput};
use crate::services::{ContactServiceError, RateLimitDecision};

/// Request body for a contact form submission
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Query parameters for the admin inbox
#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    pub limit: Option<i64>,
}

/// One message in the admin inbox
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: String,
}

impl From<ContactMessage> for MessageResponse {
    fn from(message: ContactMessage) -> Self {
        Self {
            id: message.id,
            name: message.name,
            email: message.email,
            message: message.message,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Build the public contact router
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", post(submit_contact))
}

/// Build the admin inbox router
pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", get(list_messages))
}

/// POST /api/contact - Submit a contact message
///
/// The rate limit check runs before validation, so a flooding client
/// burns quota even on malformed submissions.
pub async fn submit_contact(
    State(state): State<AppState>,
    Extension(client): Extension<ClientAddr>,
    Json(body): Json<ContactRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if let RateLimitDecision::Rejected { retry_after_secs } =
        state.contact_limiter.check_and_record(&client.0).await
    {
        tracing::warn!(client = %client.0, retry_after_secs, "Contact submission rate limited");
        return Err(ApiError::with_details(
            "RATE_LIMITED",
            "Too many messages. Try again later.",
            serde_json::json!({"retry_after_secs": retry_after_secs}),
        ));
    }

    let input = NewMessageInput {
        name: body.name,
        email: body.email,
        message: body.message,
    };

    match state.contact_service.submit(input).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({"message": "Message sent successfully"})),
        )),
        Err(ContactServiceError::ValidationError(errors)) => Err(ApiError::with_details(
            "VALIDATION_ERROR",
            "Validation failed",
            serde_json::json!({ "errors": errors }),
        )),
        Err(ContactServiceError::InternalError(e)) => {
            tracing::error!(error = %e, "Contact submission failed");
            Err(ApiError::internal_error("Internal server error"))
        }
    }
}

/// GET /api/messages - List recent messages, newest first (admin)
pub async fn list_messages(
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let messages = state
        .contact_service
        .list_recent(query.limit)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list messages");
            ApiError::internal_error("Internal server error")
        })?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}
