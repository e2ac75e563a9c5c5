//! Services layer - Business logic
//!
//! This module contains all business logic for the blog backend.
//! Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories and in-memory state
//! - Handling validation and error cases

pub mod access_gate;
pub mod contact;
pub mod post;
pub mod rate_limiter;
pub mod slug;

pub use access_gate::{AccessGate, AccessOutcome, AttemptRecord, AttemptStore, InMemoryAttemptStore};
pub use contact::{validate_message_input, ContactService, ContactServiceError};
pub use post::{PostService, PostServiceError};
pub use rate_limiter::{
    InMemoryRateLimitStore, RateLimitDecision, RateLimitRecord, RateLimitStore, RateLimiter,
};
pub use slug::slugify;
