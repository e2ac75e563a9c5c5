//! Contact message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable contact message record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Unique identifier
    pub id: String,
    /// Sender name
    pub name: String,
    /// Sender email address
    pub email: String,
    /// Message body
    pub message: String,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    /// Build a new record from validated input
    pub fn from_input(input: NewMessageInput) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            message: input.message,
            created_at: Utc::now(),
        }
    }
}

/// Input for submitting a contact message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessageInput {
    /// Sender name
    pub name: String,
    /// Sender email address
    pub email: String,
    /// Message body
    pub message: String,
}

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field
    pub field: String,
    /// Human-readable description
    pub message: String,
}

impl FieldError {
    /// Create a new field error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
