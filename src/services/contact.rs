//! Contact message service
//!
//! Validates contact form submissions and persists them for the admin
//! inbox. Validation reports every failing field at once so the form
//! can highlight all of them in a single round trip.

use crate::db::repositories::MessageRepository;
use crate::models::{ContactMessage, FieldError, NewMessageInput};
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use thiserror::Error;

/// Minimum sender name length in characters
pub const MIN_NAME_LEN: usize = 2;
/// Maximum sender name length in characters
pub const MAX_NAME_LEN: usize = 50;
/// Minimum message body length in characters
pub const MIN_MESSAGE_LEN: usize = 10;
/// Maximum message body length in characters
pub const MAX_MESSAGE_LEN: usize = 1000;

/// How many messages the admin inbox shows by default
pub const DEFAULT_INBOX_LIMIT: i64 = 50;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    // Single @ with a dot somewhere in the domain part
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});

/// Contact service errors
#[derive(Error, Debug)]
pub enum ContactServiceError {
    /// One or more fields failed validation
    #[error("Validation failed on {} field(s)", .0.len())]
    ValidationError(Vec<FieldError>),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Contact message service
pub struct ContactService {
    repo: Arc<dyn MessageRepository>,
}

impl ContactService {
    /// Create a new contact service
    pub fn new(repo: Arc<dyn MessageRepository>) -> Self {
        Self { repo }
    }

    /// Validate and persist a contact form submission
    ///
    /// # Errors
    /// - `ValidationError` with one entry per failing field
    pub async fn submit(
        &self,
        input: NewMessageInput,
    ) -> Result<ContactMessage, ContactServiceError> {
        let errors = validate_message_input(&input);
        if !errors.is_empty() {
            return Err(ContactServiceError::ValidationError(errors));
        }

        let message = ContactMessage::from_input(input);
        self.repo
            .create(&message)
            .await
            .context("Failed to store contact message")?;

        tracing::info!(message_id = %message.id, "Contact message received");
        Ok(message)
    }

    /// Fetch the most recent messages, newest first
    pub async fn list_recent(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<ContactMessage>, ContactServiceError> {
        let limit = limit.unwrap_or(DEFAULT_INBOX_LIMIT).clamp(1, 500);
        let messages = self
            .repo
            .list_recent(limit)
            .await
            .context("Failed to list contact messages")?;
        Ok(messages)
    }
}

/// Check every field and collect all failures
pub fn validate_message_input(input: &NewMessageInput) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let name_len = input.name.trim().chars().count();
    if name_len < MIN_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            format!("Name must be at least {MIN_NAME_LEN} characters"),
        ));
    } else if name_len > MAX_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            format!("Name cannot exceed {MAX_NAME_LEN} characters"),
        ));
    }

    if !EMAIL_RE.is_match(input.email.trim()) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }

    let message_len = input.message.trim().chars().count();
    if message_len < MIN_MESSAGE_LEN {
        errors.push(FieldError::new(
            "message",
            format!("Message must be at least {MIN_MESSAGE_LEN} characters"),
        ));
    } else if message_len > MAX_MESSAGE_LEN {
        errors.push(FieldError::new(
            "message",
            format!("Message cannot exceed {MAX_MESSAGE_LEN} characters"),
        ));
    }

    errors
}
