//! Blog post service
//!
//! Business logic over the post repository: input validation, slug
//! generation and uniqueness, default authorship, pagination.

use crate::db::repositories::PostRepository;
use crate::models::{
    CreatePostInput, ListParams, Post, PostFilters, PostPage, UpdatePostInput, MAX_AUTHOR_NAME_LEN,
    MAX_EXCERPT_LEN, MAX_TAG_LEN, MAX_TITLE_LEN,
};
use crate::services::slug::slugify;
use anyhow::Context;
use std::sync::Arc;
use thiserror::Error;

/// Post service errors
#[derive(Error, Debug)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Post slug already exists: {0}")]
    DuplicateSlug(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service for managing blog posts
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a new post
    ///
    /// The slug derives from the title. Unset author fields and cover
    /// image fall back to the site defaults, and `published` defaults
    /// to true.
    ///
    /// # Errors
    /// - `ValidationError` if any field fails validation
    /// - `DuplicateSlug` if the slug is already taken
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        validate_title(&input.title)?;
        validate_content(&input.content)?;
        validate_excerpt(&input.excerpt)?;
        validate_tags(&input.tags)?;
        if let Some(ref author) = input.author {
            validate_author_name(&author.name)?;
        }

        let slug = slugify(&input.title);
        if slug.is_empty() {
            return Err(PostServiceError::ValidationError(
                "Title does not produce a usable slug".to_string(),
            ));
        }

        if self
            .repo
            .exists_by_slug(&slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(PostServiceError::DuplicateSlug(slug));
        }

        let post = Post::from_input(input, slug);
        self.repo
            .create(&post)
            .await
            .context("Failed to create post")?;

        tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");
        Ok(post)
    }

    /// Get a post by ID
    ///
    /// # Errors
    /// - `NotFound` if no post has the given ID
    pub async fn get_by_id(&self, id: &str) -> Result<Post, PostServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to fetch post")?
            .ok_or_else(|| PostServiceError::NotFound(id.to_string()))
    }

    /// Get a post by slug
    ///
    /// With `require_published` set, an existing draft behaves like a
    /// missing post. Public routes use this so drafts stay invisible.
    ///
    /// # Errors
    /// - `NotFound` if no post matches (or it is an excluded draft)
    pub async fn get_by_slug(
        &self,
        slug: &str,
        require_published: bool,
    ) -> Result<Post, PostServiceError> {
        let post = self
            .repo
            .get_by_slug(slug)
            .await
            .context("Failed to fetch post")?
            .ok_or_else(|| PostServiceError::NotFound(slug.to_string()))?;

        if require_published && !post.published {
            return Err(PostServiceError::NotFound(slug.to_string()));
        }

        Ok(post)
    }

    /// List posts with pagination and filters
    ///
    /// Results are ordered newest first. The page never fails on an
    /// out-of-range page number; it just comes back empty.
    pub async fn list(
        &self,
        params: ListParams,
        filters: PostFilters,
    ) -> Result<PostPage, PostServiceError> {
        let total = self
            .repo
            .count(&filters)
            .await
            .context("Failed to count posts")?;
        let posts = self
            .repo
            .list(&filters, params.offset(), params.limit())
            .await
            .context("Failed to list posts")?;

        Ok(PostPage::new(posts, total, &params))
    }

    /// Update an existing post
    ///
    /// Only supplied fields change; the slug stays as-is unless the
    /// input names a new one, which is re-checked for uniqueness
    /// against every other post. `updated_at` refreshes on any change.
    ///
    /// # Errors
    /// - `NotFound` if no post has the given ID
    /// - `ValidationError` if a supplied field fails validation
    /// - `DuplicateSlug` if a supplied slug is already taken
    pub async fn update(
        &self,
        id: &str,
        mut input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        if self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to fetch post")?
            .is_none()
        {
            return Err(PostServiceError::NotFound(id.to_string()));
        }

        if let Some(ref title) = input.title {
            validate_title(title)?;
        }
        if let Some(ref content) = input.content {
            validate_content(content)?;
        }
        if let Some(ref excerpt) = input.excerpt {
            validate_excerpt(excerpt)?;
        }
        if let Some(ref tags) = input.tags {
            validate_tags(tags)?;
        }
        if let Some(ref author) = input.author {
            validate_author_name(&author.name)?;
        }

        if let Some(ref raw_slug) = input.slug {
            let slug = slugify(raw_slug);
            if slug.is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Slug cannot be empty".to_string(),
                ));
            }
            if self
                .repo
                .exists_by_slug_excluding(&slug, id)
                .await
                .context("Failed to check slug uniqueness")?
            {
                return Err(PostServiceError::DuplicateSlug(slug));
            }
            input.slug = Some(slug);
        }

        let post = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update post")?
            .ok_or_else(|| PostServiceError::NotFound(id.to_string()))?;

        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    /// Delete a post by ID
    ///
    /// # Errors
    /// - `NotFound` if no post has the given ID
    pub async fn delete(&self, id: &str) -> Result<(), PostServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete post")?;

        if !deleted {
            return Err(PostServiceError::NotFound(id.to_string()));
        }

        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), PostServiceError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PostServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(PostServiceError::ValidationError(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), PostServiceError> {
    if content.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Content cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_excerpt(excerpt: &str) -> Result<(), PostServiceError> {
    let excerpt = excerpt.trim();
    if excerpt.is_empty() {
        return Err(PostServiceError::ValidationError(
            "Excerpt cannot be empty".to_string(),
        ));
    }
    if excerpt.chars().count() > MAX_EXCERPT_LEN {
        return Err(PostServiceError::ValidationError(format!(
            "Excerpt cannot exceed {MAX_EXCERPT_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_tags(tags: &[String]) -> Result<(), PostServiceError> {
    if tags.is_empty() {
        return Err(PostServiceError::ValidationError(
            "At least one tag is required".to_string(),
        ));
    }
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(PostServiceError::ValidationError(
                "Tags cannot be empty".to_string(),
            ));
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(PostServiceError::ValidationError(format!(
                "Tags cannot exceed {MAX_TAG_LEN} characters"
            )));
        }
    }
    Ok(())
}

fn validate_author_name(name: &str) -> Result<(), PostServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PostServiceError::ValidationError(
            "Author name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_AUTHOR_NAME_LEN {
        return Err(PostServiceError::ValidationError(format!(
            "Author name cannot exceed {MAX_AUTHOR_NAME_LEN} characters"
        )));
    }
    Ok(())
}
