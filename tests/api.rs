//! HTTP API integration tests
//!
//! Each test spins up a full router over an in-memory SQLite database
//! and drives it through `axum_test::TestServer`.

use axum::http::header::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use blogd::api::{build_router, AppState};
use blogd::db::repositories::{SqlxMessageRepository, SqlxPostRepository};
use blogd::db::{create_test_pool, migrations};
use blogd::services::{AccessGate, ContactService, PostService, RateLimiter};

const ADMIN_TOKEN: &str = "true";
const ACCESS_CODE: &str = "070605";

async fn test_server() -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Migrations failed");

    let state = AppState {
        pool: pool.clone(),
        post_service: Arc::new(PostService::new(SqlxPostRepository::boxed(pool.clone()))),
        contact_service: Arc::new(ContactService::new(SqlxMessageRepository::boxed(pool))),
        access_gate: Arc::new(AccessGate::new(ACCESS_CODE, 5, 15)),
        contact_limiter: Arc::new(RateLimiter::new(3600, 5)),
        admin_token: Arc::from(ADMIN_TOKEN),
    };

    let app = build_router(state, "http://localhost:3000").expect("Failed to build router");
    TestServer::new(app).expect("Failed to start test server")
}

fn admin_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-admin-token"),
        HeaderValue::from_static(ADMIN_TOKEN),
    )
}

fn sample_post(title: &str) -> Value {
    json!({
        "title": title,
        "excerpt": "A short excerpt for the post.",
        "content": "Full content of the post, long enough to be real.",
        "tags": ["rust", "web"],
    })
}

fn valid_contact() -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "message": "Hello, I would like to get in touch about your work.",
    })
}

#[tokio::test]
async fn health_reports_ok() {
    let server = test_server().await;

    let response = server.get("/api/health").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn list_posts_starts_empty() {
    let server = test_server().await;

    let response = server.get("/api/blog").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["posts"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 0);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn post_mutations_require_admin_token() {
    let server = test_server().await;

    let response = server.post("/api/blog").json(&sample_post("No Token")).await;
    assert_eq!(response.status_code(), 401);

    let response = server
        .post("/api/blog")
        .add_header(
            HeaderName::from_static("x-admin-token"),
            HeaderValue::from_static("wrong"),
        )
        .json(&sample_post("Bad Token"))
        .await;
    assert_eq!(response.status_code(), 401);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn create_and_fetch_post() {
    let server = test_server().await;
    let (name, value) = admin_header();

    let response = server
        .post("/api/blog")
        .add_header(name, value)
        .json(&sample_post("Hello, World!"))
        .await;
    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    assert_eq!(body["post"]["slug"], "hello-world");
    assert_eq!(body["post"]["author"]["name"], "Admin");
    assert_eq!(body["post"]["published"], true);
    assert_eq!(body["message"], "Post created successfully");

    let response = server.get("/api/blog/slug/hello-world").await;
    assert_eq!(response.status_code(), 200);
    let post: Value = response.json();
    assert_eq!(post["title"], "Hello, World!");
}

#[tokio::test]
async fn drafts_hidden_from_public_but_visible_to_admin() {
    let server = test_server().await;
    let (name, value) = admin_header();

    let mut draft = sample_post("Secret Draft");
    draft["published"] = json!(false);

    let response = server
        .post("/api/blog")
        .add_header(name.clone(), value.clone())
        .json(&draft)
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let id = body["post"]["id"].as_str().unwrap().to_string();

    // Public slug lookup cannot see it
    let response = server.get("/api/blog/slug/secret-draft").await;
    assert_eq!(response.status_code(), 404);

    // Public listing skips it
    let response = server.get("/api/blog").await;
    let listing: Value = response.json();
    assert_eq!(listing["total"], 0);

    // Admin by-ID read still works
    let response = server
        .get(&format!("/api/blog/{id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn duplicate_slug_rejected() {
    let server = test_server().await;
    let (name, value) = admin_header();

    let response = server
        .post("/api/blog")
        .add_header(name.clone(), value.clone())
        .json(&sample_post("Same Title"))
        .await;
    assert_eq!(response.status_code(), 201);

    let response = server
        .post("/api/blog")
        .add_header(name, value)
        .json(&sample_post("Same Title"))
        .await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "DUPLICATE_SLUG");
    assert_eq!(body["error"]["details"]["value"], "same-title");
}

#[tokio::test]
async fn update_and_delete_post() {
    let server = test_server().await;
    let (name, value) = admin_header();

    let response = server
        .post("/api/blog")
        .add_header(name.clone(), value.clone())
        .json(&sample_post("Original"))
        .await;
    let body: Value = response.json();
    let id = body["post"]["id"].as_str().unwrap().to_string();

    let response = server
        .put(&format!("/api/blog/{id}"))
        .add_header(name.clone(), value.clone())
        .json(&json!({"title": "Renamed"}))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["post"]["title"], "Renamed");
    // Slug stays put on a title-only update
    assert_eq!(body["post"]["slug"], "original");

    let response = server
        .delete(&format!("/api/blog/{id}"))
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), 200);

    let response = server
        .delete(&format!("/api/blog/{id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn list_filters_by_tag() {
    let server = test_server().await;
    let (name, value) = admin_header();

    let mut tagged = sample_post("Rust Post");
    tagged["tags"] = json!(["rust"]);
    server
        .post("/api/blog")
        .add_header(name.clone(), value.clone())
        .json(&tagged)
        .await;

    let mut other = sample_post("Design Post");
    other["tags"] = json!(["design"]);
    server
        .post("/api/blog")
        .add_header(name, value)
        .json(&other)
        .await;

    let response = server.get("/api/blog?tag=rust").await;
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["posts"][0]["title"], "Rust Post");
}

#[tokio::test]
async fn list_extreme_page_returns_empty() {
    let server = test_server().await;
    let (name, value) = admin_header();

    server
        .post("/api/blog")
        .add_header(name, value)
        .json(&sample_post("Only Post"))
        .await;

    let response = server.get("/api/blog?page=4294967295").await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["posts"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 1);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn contact_validation_reports_all_fields() {
    let server = test_server().await;

    let response = server
        .post("/api/contact")
        .json(&json!({"name": "J", "email": "nope", "message": "short"}))
        .await;
    assert_eq!(response.status_code(), 400);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn contact_submission_accepted_then_rate_limited() {
    let server = test_server().await;

    for _ in 0..5 {
        let response = server.post("/api/contact").json(&valid_contact()).await;
        assert_eq!(response.status_code(), 201);
        let body: Value = response.json();
        assert_eq!(body["message"], "Message sent successfully");
    }

    let response = server.post("/api/contact").json(&valid_contact()).await;
    assert_eq!(response.status_code(), 429);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn admin_inbox_lists_messages() {
    let server = test_server().await;
    let (name, value) = admin_header();

    server.post("/api/contact").json(&valid_contact()).await;

    // No token, no inbox
    let response = server.get("/api/messages").await;
    assert_eq!(response.status_code(), 401);

    let response = server.get("/api/messages").add_header(name, value).await;
    assert_eq!(response.status_code(), 200);
    let inbox: Value = response.json();
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["email"], "jane@example.com");
}

#[tokio::test]
async fn verify_access_code_flow() {
    let server = test_server().await;

    // Missing code rejected without touching the attempt counter
    let response = server.post("/api/auth/verify").json(&json!({})).await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/api/auth/verify")
        .json(&json!({"code": "000000"}))
        .await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["remaining_attempts"], 4);

    let response = server
        .post("/api/auth/verify")
        .json(&json!({"code": ACCESS_CODE}))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Access granted");
}

#[tokio::test]
async fn verify_access_locks_out_after_failures() {
    let server = test_server().await;

    for _ in 0..4 {
        let response = server
            .post("/api/auth/verify")
            .json(&json!({"code": "wrong"}))
            .await;
        assert_eq!(response.status_code(), 401);
    }

    let response = server
        .post("/api/auth/verify")
        .json(&json!({"code": "wrong"}))
        .await;
    assert_eq!(response.status_code(), 429);
    let body: Value = response.json();
    assert_eq!(body["locked"], true);
    assert!(body["retry_after_secs"].as_i64().unwrap() > 0);

    // Correct code no longer helps while locked
    let response = server
        .post("/api/auth/verify")
        .json(&json!({"code": ACCESS_CODE}))
        .await;
    assert_eq!(response.status_code(), 429);
}
