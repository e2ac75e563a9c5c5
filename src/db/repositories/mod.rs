//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod message;
pub mod post;

pub use message::{MessageRepository, SqlxMessageRepository};
pub use post::{PostRepository, SqlxPostRepository};
