//! Data models
//!
//! This module contains all data structures used throughout the blogd service.
//! Models represent:
//! - Database entities (Post, ContactMessage)
//! - API request/response building blocks
//! - Pagination and filter types

mod message;
mod post;

pub use message::{ContactMessage, FieldError, NewMessageInput};
pub use post::{
    Author, CreatePostInput, ListParams, Post, PostFilters, PostPage, UpdatePostInput,
    DEFAULT_AUTHOR_IMAGE, DEFAULT_AUTHOR_NAME, DEFAULT_COVER_IMAGE, MAX_AUTHOR_NAME_LEN,
    MAX_EXCERPT_LEN, MAX_TAG_LEN, MAX_TITLE_LEN,
};
