//! Post repository
//!
//! Database operations for blog posts.
//!
//! This module provides:
//! - `PostRepository` trait defining the interface for post data access
//! - `SqlxPostRepository` implementing the trait for SQLite and MySQL
//!
//! Tags are stored as a JSON array in a TEXT column. The exact-tag filter
//! relies on the quoted form of the tag inside that JSON text, so a filter
//! for `rust` never matches `rust-lang`.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Author, Post, PostFilters, UpdatePostInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post
    async fn create(&self, post: &Post) -> Result<()>;

    /// Get post by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Post>>;

    /// Get post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// List posts matching the filters, newest first
    async fn list(&self, filters: &PostFilters, offset: i64, limit: i64) -> Result<Vec<Post>>;

    /// Count posts matching the filters
    async fn count(&self, filters: &PostFilters) -> Result<i64>;

    /// Apply a partial update; returns the updated post, or None if absent
    async fn update(&self, id: &str, input: &UpdatePostInput) -> Result<Option<Post>>;

    /// Hard-delete a post; returns whether a row was removed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Check if a slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Check if a slug exists on a different post (for updates)
    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: &str) -> Result<bool>;
}

/// SQLx-based post repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }

    fn sqlite(&self) -> Result<&SqlitePool> {
        self.pool.as_sqlite().context("SQLite pool unavailable")
    }

    fn mysql(&self) -> Result<&MySqlPool> {
        self.pool.as_mysql().context("MySQL pool unavailable")
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.sqlite()?, post).await,
            DatabaseDriver::Mysql => create_post_mysql(self.mysql()?, post).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_id_sqlite(self.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.mysql()?, id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_slug_sqlite(self.sqlite()?, slug).await,
            DatabaseDriver::Mysql => get_post_by_slug_mysql(self.mysql()?, slug).await,
        }
    }

    async fn list(&self, filters: &PostFilters, offset: i64, limit: i64) -> Result<Vec<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_posts_sqlite(self.sqlite()?, filters, offset, limit).await,
            DatabaseDriver::Mysql => list_posts_mysql(self.mysql()?, filters, offset, limit).await,
        }
    }

    async fn count(&self, filters: &PostFilters) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_posts_sqlite(self.sqlite()?, filters).await,
            DatabaseDriver::Mysql => count_posts_mysql(self.mysql()?, filters).await,
        }
    }

    async fn update(&self, id: &str, input: &UpdatePostInput) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_post_sqlite(self.sqlite()?, id, input).await,
            DatabaseDriver::Mysql => update_post_mysql(self.mysql()?, id, input).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_post_sqlite(self.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_post_mysql(self.mysql()?, id).await,
        }
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => exists_by_slug_sqlite(self.sqlite()?, slug).await,
            DatabaseDriver::Mysql => exists_by_slug_mysql(self.mysql()?, slug).await,
        }
    }

    async fn exists_by_slug_excluding(&self, slug: &str, exclude_id: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                exists_by_slug_excluding_sqlite(self.sqlite()?, slug, exclude_id).await
            }
            DatabaseDriver::Mysql => {
                exists_by_slug_excluding_mysql(self.mysql()?, slug, exclude_id).await
            }
        }
    }
}

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, cover_image, tags, author_name, author_image, published, created_at, updated_at";

/// Build the WHERE clause for the given filters.
///
/// Bind order is fixed: tag pattern first (if any), then the three search
/// patterns (if any). `bind_filters` must mirror this order.
fn filter_clause(filters: &PostFilters) -> String {
    let mut conditions: Vec<&str> = Vec::new();

    if filters.published_only {
        conditions.push("published = 1");
    }
    if filters.tag.is_some() {
        conditions.push("tags LIKE ? ESCAPE '!'");
    }
    if filters.search.is_some() {
        conditions.push(
            "(LOWER(title) LIKE ? ESCAPE '!' OR LOWER(content) LIKE ? ESCAPE '!' OR LOWER(excerpt) LIKE ? ESCAPE '!')",
        );
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Escape LIKE metacharacters so user input matches literally.
///
/// Uses `!` as the escape character since a backslash inside a string
/// literal means different things to SQLite and MySQL.
fn escape_like(value: &str) -> String {
    value
        .replace('!', "!!")
        .replace('%', "!%")
        .replace('_', "!_")
}

/// Pattern matching the quoted tag inside the JSON tags column
fn tag_pattern(tag: &str) -> String {
    format!("%\"{}\"%", escape_like(tag))
}

fn search_pattern(search: &str) -> String {
    format!("%{}%", escape_like(&search.to_lowercase()))
}

macro_rules! bind_filters {
    ($query:expr, $filters:expr) => {{
        let mut q = $query;
        if let Some(tag) = &$filters.tag {
            q = q.bind(tag_pattern(tag));
        }
        if let Some(search) = &$filters.search {
            let pattern = search_pattern(search);
            q = q.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
        }
        q
    }};
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<()> {
    let tags_json = serde_json::to_string(&post.tags).context("Failed to serialize tags")?;

    sqlx::query(
        r#"
        INSERT INTO posts (id, title, slug, excerpt, content, cover_image, tags, author_name, author_image, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.id)
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.cover_image)
    .bind(&tags_json)
    .bind(&post.author.name)
    .bind(&post.author.image)
    .bind(post.published)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(())
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn get_post_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts WHERE slug = ?", POST_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_post_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_posts_sqlite(
    pool: &SqlitePool,
    filters: &PostFilters,
    offset: i64,
    limit: i64,
) -> Result<Vec<Post>> {
    let sql = format!(
        "SELECT {} FROM posts{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        POST_COLUMNS,
        filter_clause(filters)
    );

    let query = bind_filters!(sqlx::query(&sql), filters);
    let rows = query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row_to_post_sqlite(&row)?);
    }

    Ok(posts)
}

async fn count_posts_sqlite(pool: &SqlitePool, filters: &PostFilters) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) as count FROM posts{}",
        filter_clause(filters)
    );

    let query = bind_filters!(sqlx::query(&sql), filters);
    let row = query
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn update_post_sqlite(
    pool: &SqlitePool,
    id: &str,
    input: &UpdatePostInput,
) -> Result<Option<Post>> {
    let existing = match get_post_by_id_sqlite(pool, id).await? {
        Some(post) => post,
        None => return Ok(None),
    };

    let now = Utc::now();
    let new_title = input.title.as_ref().unwrap_or(&existing.title);
    let new_slug = input.slug.as_ref().unwrap_or(&existing.slug);
    let new_excerpt = input.excerpt.as_ref().unwrap_or(&existing.excerpt);
    let new_content = input.content.as_ref().unwrap_or(&existing.content);
    let new_cover = input.cover_image.as_ref().unwrap_or(&existing.cover_image);
    let new_tags = input.tags.as_ref().unwrap_or(&existing.tags);
    let new_author = input.author.as_ref().unwrap_or(&existing.author);
    let new_published = input.published.unwrap_or(existing.published);
    let tags_json = serde_json::to_string(new_tags).context("Failed to serialize tags")?;

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, slug = ?, excerpt = ?, content = ?, cover_image = ?, tags = ?, author_name = ?, author_image = ?, published = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(new_title)
    .bind(new_slug)
    .bind(new_excerpt)
    .bind(new_content)
    .bind(new_cover)
    .bind(&tags_json)
    .bind(&new_author.name)
    .bind(&new_author.image)
    .bind(new_published)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_sqlite(pool, id).await
}

async fn delete_post_sqlite(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

async fn exists_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn exists_by_slug_excluding_sqlite(
    pool: &SqlitePool,
    slug: &str,
    exclude_id: &str,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ? AND id != ?")
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let tags_json: String = row.get("tags");
    let tags: Vec<String> =
        serde_json::from_str(&tags_json).context("Invalid tags column content")?;

    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        cover_image: row.get("cover_image"),
        tags,
        author: Author {
            name: row.get("author_name"),
            image: row.get("author_image"),
        },
        published: row.get("published"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, post: &Post) -> Result<()> {
    let tags_json = serde_json::to_string(&post.tags).context("Failed to serialize tags")?;

    sqlx::query(
        r#"
        INSERT INTO posts (id, title, slug, excerpt, content, cover_image, tags, author_name, author_image, published, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.id)
    .bind(&post.title)
    .bind(&post.slug)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.cover_image)
    .bind(&tags_json)
    .bind(&post.author.name)
    .bind(&post.author.image)
    .bind(post.published)
    .bind(post.created_at)
    .bind(post.updated_at)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(())
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_post_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn get_post_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Post>> {
    let row = sqlx::query(&format!("SELECT {} FROM posts WHERE slug = ?", POST_COLUMNS))
        .bind(slug)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by slug")?;

    match row {
        Some(row) => Ok(Some(row_to_post_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_posts_mysql(
    pool: &MySqlPool,
    filters: &PostFilters,
    offset: i64,
    limit: i64,
) -> Result<Vec<Post>> {
    let sql = format!(
        "SELECT {} FROM posts{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        POST_COLUMNS,
        filter_clause(filters)
    );

    let query = bind_filters!(sqlx::query(&sql), filters);
    let rows = query
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    let mut posts = Vec::new();
    for row in rows {
        posts.push(row_to_post_mysql(&row)?);
    }

    Ok(posts)
}

async fn count_posts_mysql(pool: &MySqlPool, filters: &PostFilters) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) as count FROM posts{}",
        filter_clause(filters)
    );

    let query = bind_filters!(sqlx::query(&sql), filters);
    let row = query
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn update_post_mysql(
    pool: &MySqlPool,
    id: &str,
    input: &UpdatePostInput,
) -> Result<Option<Post>> {
    let existing = match get_post_by_id_mysql(pool, id).await? {
        Some(post) => post,
        None => return Ok(None),
    };

    let now = Utc::now();
    let new_title = input.title.as_ref().unwrap_or(&existing.title);
    let new_slug = input.slug.as_ref().unwrap_or(&existing.slug);
    let new_excerpt = input.excerpt.as_ref().unwrap_or(&existing.excerpt);
    let new_content = input.content.as_ref().unwrap_or(&existing.content);
    let new_cover = input.cover_image.as_ref().unwrap_or(&existing.cover_image);
    let new_tags = input.tags.as_ref().unwrap_or(&existing.tags);
    let new_author = input.author.as_ref().unwrap_or(&existing.author);
    let new_published = input.published.unwrap_or(existing.published);
    let tags_json = serde_json::to_string(new_tags).context("Failed to serialize tags")?;

    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, slug = ?, excerpt = ?, content = ?, cover_image = ?, tags = ?, author_name = ?, author_image = ?, published = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(new_title)
    .bind(new_slug)
    .bind(new_excerpt)
    .bind(new_content)
    .bind(new_cover)
    .bind(&tags_json)
    .bind(&new_author.name)
    .bind(&new_author.image)
    .bind(new_published)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_mysql(pool, id).await
}

async fn delete_post_mysql(pool: &MySqlPool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

async fn exists_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn exists_by_slug_excluding_mysql(
    pool: &MySqlPool,
    slug: &str,
    exclude_id: &str,
) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE slug = ? AND id != ?")
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
        .context("Failed to check post slug existence")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Post> {
    let tags_json: String = row.get("tags");
    let tags: Vec<String> =
        serde_json::from_str(&tags_json).context("Invalid tags column content")?;

    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        cover_image: row.get("cover_image"),
        tags,
        author: Author {
            name: row.get("author_name"),
            image: row.get("author_image"),
        },
        published: row.get("published"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
