//! blogd - Portfolio blog backend

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogd::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxMessageRepository, SqlxPostRepository},
    },
    services::{AccessGate, ContactService, PostService, RateLimiter},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogd=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting blogd...");

    // Load configuration (file, then environment overrides)
    let config_path = std::env::var("BLOGD_CONFIG").unwrap_or_else(|_| "config.yml".to_string());
    let config = Config::load_with_env(Path::new(&config_path))?;
    tracing::info!("Configuration loaded from {}", config_path);

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories and services
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let message_repo = SqlxMessageRepository::boxed(pool.clone());

    let post_service = Arc::new(PostService::new(post_repo));
    let contact_service = Arc::new(ContactService::new(message_repo));

    let access_gate = Arc::new(AccessGate::new(
        config.auth.access_code.clone(),
        config.auth.max_attempts,
        config.auth.lockout_minutes,
    ));
    let contact_limiter = Arc::new(RateLimiter::new(
        config.rate_limit.window_secs,
        config.rate_limit.max_requests,
    ));

    let state = AppState {
        pool: pool.clone(),
        post_service,
        contact_service,
        access_gate: access_gate.clone(),
        contact_limiter: contact_limiter.clone(),
        admin_token: Arc::from(config.auth.admin_token.as_str()),
    };

    // Background sweep of expired rate limit windows and stale attempt
    // records (runs every 5 minutes)
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            contact_limiter.cleanup().await;
            access_gate.cleanup().await;
        }
    });

    // Build router
    let app = api::build_router(state, &config.server.cors_origin)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
