//! Blog post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `Author` attribution embedded in each post
//! - Input types for creating and updating posts
//! - Pagination and filter types for list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback author name when the request supplies none
pub const DEFAULT_AUTHOR_NAME: &str = "Admin";
/// Fallback author avatar when the request supplies none
pub const DEFAULT_AUTHOR_IMAGE: &str = "/images/default-avatar.jpg";
/// Fallback cover image when the request supplies none
pub const DEFAULT_COVER_IMAGE: &str = "/images/default-cover.jpg";

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum excerpt length in characters
pub const MAX_EXCERPT_LEN: usize = 200;
/// Maximum length of a single tag
pub const MAX_TAG_LEN: usize = 20;
/// Maximum author name length
pub const MAX_AUTHOR_NAME_LEN: usize = 50;

/// Blog post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier, assigned by the store on creation
    pub id: String,
    /// Post title
    pub title: String,
    /// URL-friendly slug, unique across all posts
    pub slug: String,
    /// Short summary shown in listings
    pub excerpt: String,
    /// Full post body
    pub content: String,
    /// Cover image URL
    pub cover_image: String,
    /// Ordered tags
    pub tags: Vec<String>,
    /// Author attribution
    pub author: Author,
    /// Whether the post is publicly visible
    pub published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, refreshed on every mutation
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a new post from validated creation input, filling defaults
    /// and assigning a fresh id.
    pub fn from_input(input: CreatePostInput, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            slug,
            excerpt: input.excerpt,
            content: input.content,
            cover_image: input
                .cover_image
                .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string()),
            tags: input.tags,
            author: input.author.unwrap_or_default(),
            published: input.published.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Author attribution embedded in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name
    pub name: String,
    /// Avatar image URL
    pub image: String,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            name: DEFAULT_AUTHOR_NAME.to_string(),
            image: DEFAULT_AUTHOR_IMAGE.to_string(),
        }
    }
}

/// Input for creating a new post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostInput {
    /// Post title, also the source of the slug
    pub title: String,
    /// Short summary
    pub excerpt: String,
    /// Full body
    pub content: String,
    /// Tags, at least one required
    pub tags: Vec<String>,
    /// Cover image URL (optional, defaults to the sentinel cover)
    pub cover_image: Option<String>,
    /// Author attribution (optional, defaults to Admin)
    pub author: Option<Author>,
    /// Visibility flag (optional, defaults to true)
    pub published: Option<bool>,
}

impl CreatePostInput {
    /// Create a new input with the required fields
    pub fn new(title: String, excerpt: String, content: String, tags: Vec<String>) -> Self {
        Self {
            title,
            excerpt,
            content,
            tags,
            cover_image: None,
            author: None,
            published: None,
        }
    }

    /// Set the cover image
    pub fn with_cover_image(mut self, cover_image: String) -> Self {
        self.cover_image = Some(cover_image);
        self
    }

    /// Set the author
    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    /// Set the published flag
    pub fn with_published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }
}

/// Input for partially updating an existing post
///
/// Only fields that are `Some` are applied; everything else keeps its
/// stored value. The slug is never re-derived from a title change and
/// only moves when explicitly supplied here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New slug (optional, uniqueness re-checked when present)
    pub slug: Option<String>,
    /// New excerpt (optional)
    pub excerpt: Option<String>,
    /// New body (optional)
    pub content: Option<String>,
    /// New cover image URL (optional)
    pub cover_image: Option<String>,
    /// New tags (optional)
    pub tags: Option<Vec<String>>,
    /// New author attribution (optional)
    pub author: Option<Author>,
    /// New visibility flag (optional)
    pub published: Option<bool>,
}

impl UpdatePostInput {
    /// Create a new empty update input
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    /// Set the slug
    pub fn with_slug(mut self, slug: String) -> Self {
        self.slug = Some(slug);
        self
    }

    /// Set the excerpt
    pub fn with_excerpt(mut self, excerpt: String) -> Self {
        self.excerpt = Some(excerpt);
        self
    }

    /// Set the content
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Set the published flag
    pub fn with_published(mut self, published: bool) -> Self {
        self.published = Some(published);
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.slug.is_some()
            || self.excerpt.is_some()
            || self.content.is_some()
            || self.cover_image.is_some()
            || self.tags.is_some()
            || self.author.is_some()
            || self.published.is_some()
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 6,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        // Widen before multiplying so extreme page numbers cannot overflow
        self.page.saturating_sub(1) as i64 * self.per_page as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Filters applied to list queries
#[derive(Debug, Clone, Default)]
pub struct PostFilters {
    /// Only posts whose tags contain this exact string
    pub tag: Option<String>,
    /// Case-insensitive substring match over title, content, and excerpt
    pub search: Option<String>,
    /// Restrict to published posts (public listings)
    pub published_only: bool,
}

impl PostFilters {
    /// Filters for the public listing: published posts only
    pub fn published() -> Self {
        Self {
            published_only: true,
            ..Self::default()
        }
    }
}

/// One page of posts with pagination bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    /// Posts in the current page, newest first
    pub posts: Vec<Post>,
    /// Total number of posts matching the filters
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl PostPage {
    /// Create a new page
    pub fn new(posts: Vec<Post>, total: i64, params: &ListParams) -> Self {
        Self {
            posts,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Whether more posts exist past this page
    pub fn has_more(&self) -> bool {
        (self.page as i64) * (self.per_page as i64) < self.total
    }

    /// Number of posts in the current page
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Check if the page is empty
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_fills_defaults() {
        let input = CreatePostInput::new(
            "Hello".to_string(),
            "An excerpt".to_string(),
            "Body".to_string(),
            vec!["rust".to_string()],
        );
        let post = Post::from_input(input, "hello".to_string());

        assert!(!post.id.is_empty());
        assert_eq!(post.slug, "hello");
        assert_eq!(post.cover_image, DEFAULT_COVER_IMAGE);
        assert_eq!(post.author.name, DEFAULT_AUTHOR_NAME);
        assert_eq!(post.author.image, DEFAULT_AUTHOR_IMAGE);
        assert!(post.published);
        assert_eq!(post.created_at, post.updated_at);
    }

    #[test]
    fn test_from_input_respects_explicit_fields() {
        let input = CreatePostInput::new(
            "Hello".to_string(),
            "An excerpt".to_string(),
            "Body".to_string(),
            vec!["rust".to_string()],
        )
        .with_cover_image("/images/custom.jpg".to_string())
        .with_author(Author {
            name: "Jo".to_string(),
            image: "/images/jo.png".to_string(),
        })
        .with_published(false);

        let post = Post::from_input(input, "hello".to_string());

        assert_eq!(post.cover_image, "/images/custom.jpg");
        assert_eq!(post.author.name, "Jo");
        assert!(!post.published);
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 0);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 1);

        let params = ListParams::new(3, 500);
        assert_eq!(params.page, 3);
        assert_eq!(params.per_page, 100);
    }

    #[test]
    fn test_list_params_offset() {
        let params = ListParams::new(3, 6);
        assert_eq!(params.offset(), 12);
        assert_eq!(params.limit(), 6);
    }

    #[test]
    fn test_list_params_offset_extreme_page() {
        // Must not overflow; an absurd page simply yields a huge offset
        let params = ListParams::new(u32::MAX, 100);
        assert_eq!(params.offset(), (u32::MAX as i64 - 1) * 100);
    }

    #[test]
    fn test_post_page_has_more() {
        let params = ListParams::new(1, 6);
        let page = PostPage::new(Vec::new(), 13, &params);
        assert!(page.has_more());

        let params = ListParams::new(3, 6);
        let page = PostPage::new(Vec::new(), 13, &params);
        assert!(!page.has_more());

        // Exact boundary: page*limit == total means no more
        let params = ListParams::new(2, 6);
        let page = PostPage::new(Vec::new(), 12, &params);
        assert!(!page.has_more());
    }

    #[test]
    fn test_update_input_has_changes() {
        assert!(!UpdatePostInput::new().has_changes());
        assert!(UpdatePostInput::new()
            .with_title("X".to_string())
            .has_changes());
        assert!(UpdatePostInput::new()
            .with_published(false)
            .has_changes());
    }
}
