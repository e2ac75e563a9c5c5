//! Contact message repository
//!
//! Append-only persistence for contact form submissions. Messages are
//! never updated or deleted through this interface.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::ContactMessage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Contact message repository trait
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message
    async fn create(&self, message: &ContactMessage) -> Result<()>;

    /// List the most recent messages, newest first
    async fn list_recent(&self, limit: i64) -> Result<Vec<ContactMessage>>;
}

/// SQLx-based message repository implementation
pub struct SqlxMessageRepository {
    pool: DynDatabasePool,
}

impl SqlxMessageRepository {
    /// Create a new SQLx message repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn MessageRepository> {
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
impl MessageRepository for SqlxMessageRepository {
    async fn create(&self, message: &ContactMessage) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_message_sqlite(self.sqlite()?, message).await,
            DatabaseDriver::Mysql => create_message_mysql(self.mysql()?, message).await,
        }
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<ContactMessage>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_recent_sqlite(self.sqlite()?, limit).await,
            DatabaseDriver::Mysql => list_recent_mysql(self.mysql()?, limit).await,
        }
    }
}

async fn create_message_sqlite(pool: &SqlitePool, message: &ContactMessage) -> Result<()> {
    sqlx::query(
        "INSERT INTO messages (id, name, email, message, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&message.id)
    .bind(&message.name)
    .bind(&message.email)
    .bind(&message.message)
    .bind(message.created_at)
    .execute(pool)
    .await
    .context("Failed to create message")?;

    Ok(())
}

async fn list_recent_sqlite(pool: &SqlitePool, limit: i64) -> Result<Vec<ContactMessage>> {
    let rows = sqlx::query(
        "SELECT id, name, email, message, created_at FROM messages ORDER BY created_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to list messages")?;

    Ok(rows.iter().map(row_to_message_sqlite).collect())
}

fn row_to_message_sqlite(row: &sqlx::sqlite::SqliteRow) -> ContactMessage {
    ContactMessage {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        message: row.get("message"),
        created_at: row.get("created_at"),
    }
}

async fn create_message_mysql(pool: &MySqlPool, message: &ContactMessage) -> Result<()> {
    sqlx::query(
        "INSERT INTO messages (id, name, email, message, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&message.id)
    .bind(&message.name)
    .bind(&message.email)
    .bind(&message.message)
    .bind(message.created_at)
    .execute(pool)
    .await
    .context("Failed to create message")?;

    Ok(())
}

async fn list_recent_mysql(pool: &MySqlPool, limit: i64) -> Result<Vec<ContactMessage>> {
    let rows = sqlx::query(
        "SELECT id, name, email, message, created_at FROM messages ORDER BY created_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("Failed to list messages")?;

    Ok(rows.iter().map(row_to_message_mysql).collect())
}

fn row_to_message_mysql(row: &sqlx::mysql::MySqlRow) -> ContactMessage {
    ContactMessage {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        message: row.get("message"),
        created_at: row.get("created_at"),
    }
}
