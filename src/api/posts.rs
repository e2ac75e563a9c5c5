//! Post API endpoints
//!
//! Handles HTTP requests for blog post management:
//! - GET /api/blog - List published posts with pagination
//! - GET /api/blog/slug/{slug} - Get a published post by slug
//! - POST /api/blog - Create a post (admin)
//! - GET /api/blog/{id} - Get any post by ID (admin)
//! - PUT /api/blog/{id} - Update a post (admin)
//! - DELETE /api/blog/{id} - Delete a post (admin)
//!
//! Public slug reads sit under the static `/slug/` prefix so the ID
//! parameter routes can share the same nesting.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Author, CreatePostInput, ListParams, Post, PostFilters, UpdatePostInput};

/// Query parameters for listing posts
#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Only posts carrying this exact tag
    pub tag: Option<String>,
    /// Case-insensitive text search over title, content, and excerpt
    pub search: Option<String>,
}

fn default_page() -> u32 {
    1
}
fn default_limit() -> u32 {
    6
}

/// Response for a single post
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
    pub tags: Vec<String>,
    pub author: Author,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            cover_image: post.cover_image,
            tags: post.tags,
            author: post.author,
            published: post.published,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// Response for the post list
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

/// Response wrapping a mutated post with a confirmation message
#[derive(Debug, Serialize)]
pub struct PostMutationResponse {
    pub post: PostResponse,
    pub message: String,
}

/// Request body for creating a post
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub author: Option<Author>,
    pub published: Option<bool>,
}

/// Request body for updating a post
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author: Option<Author>,
    pub published: Option<bool>,
}

/// Build the public posts router (published content only)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts))
        .route("/slug/{slug}", get(get_post))
}

/// Build the protected posts router (creation and by-ID operations)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_post))
        .route("/{id}", get(get_post_by_id))
        .route("/{id}", put(update_post))
        .route("/{id}", delete(delete_post))
}

/// GET /api/blog - List published posts with pagination
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let params = ListParams::new(query.page, query.limit);
    let filters = PostFilters {
        tag: query.tag.filter(|t| !t.trim().is_empty()),
        search: query.search.filter(|s| !s.trim().is_empty()),
        published_only: true,
    };

    let result = state.post_service.list(params, filters).await?;

    let has_more = result.has_more();
    Ok(Json(PostListResponse {
        posts: result.posts.into_iter().map(Into::into).collect(),
        total: result.total,
        page: result.page,
        limit: result.per_page,
        has_more,
    }))
}

/// GET /api/blog/slug/{slug} - Get a published post by slug
///
/// Drafts return 404 so their existence never leaks to the public.
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_service.get_by_slug(&slug, true).await?;
    Ok(Json(post.into()))
}

/// GET /api/blog/{id} - Get any post by ID (admin)
///
/// Returns the post regardless of publication state.
pub async fn get_post_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.post_service.get_by_id(&id).await?;
    Ok(Json(post.into()))
}

/// POST /api/blog - Create a post (admin)
pub async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostMutationResponse>), ApiError> {
    let mut input = CreatePostInput::new(body.title, body.excerpt, body.content, body.tags);
    input.cover_image = body.cover_image;
    input.author = body.author;
    input.published = body.published;

    let post = state.post_service.create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostMutationResponse {
            post: post.into(),
            message: "Post created successfully".to_string(),
        }),
    ))
}

/// PUT /api/blog/{id} - Update a post (admin)
///
/// Applies only supplied fields. The slug never tracks a title change;
/// it only moves when the body names a new one.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Json<PostMutationResponse>, ApiError> {
    let input = UpdatePostInput {
        title: body.title,
        slug: body.slug,
        excerpt: body.excerpt,
        content: body.content,
        cover_image: body.cover_image,
        tags: body.tags,
        author: body.author,
        published: body.published,
    };

    if !input.has_changes() {
        return Err(ApiError::validation_error("No fields to update"));
    }

    let post = state.post_service.update(&id, input).await?;

    Ok(Json(PostMutationResponse {
        post: post.into(),
        message: "Post updated successfully".to_string(),
    }))
}

/// DELETE /api/blog/{id} - Delete a post (admin)
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.post_service.delete(&id).await?;
    Ok(Json(
        serde_json::json!({"message": "Post deleted successfully"}),
    ))
}
