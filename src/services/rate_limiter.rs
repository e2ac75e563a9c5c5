//! Fixed-window request rate limiting
//!
//! Admits or rejects requests against a fixed quota per fixed time
//! window, keyed by client identity (the originating network address).
//! The contact endpoint uses this directly.
//!
//! State lives behind the [`RateLimitStore`] trait so the default
//! in-memory map can be swapped for a distributed cache. The in-memory
//! implementation is single-process only: counts reset on restart and
//! are not shared between server instances.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-client counting window
#[derive(Debug, Clone)]
pub struct RateLimitRecord {
    /// Start of the current counting window
    pub window_start: DateTime<Utc>,
    /// Requests admitted since the window started
    pub count: u32,
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted and counted
    Admitted,
    /// Quota exhausted; retry once the window rolls over
    Rejected {
        /// Seconds until the current window expires
        retry_after_secs: i64,
    },
}

/// Key-value backing store for rate limit records
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Fetch the record for a client, if any
    async fn get(&self, key: &str) -> Option<RateLimitRecord>;

    /// Store or replace the record for a client
    async fn set(&self, key: &str, record: RateLimitRecord);

    /// Drop the record for a client
    async fn remove(&self, key: &str);

    /// Drop every record whose window started before `cutoff`
    async fn expire_before(&self, cutoff: DateTime<Utc>);
}

/// In-memory store backed by a process-wide map
#[derive(Default)]
pub struct InMemoryRateLimitStore {
    records: RwLock<HashMap<String, RateLimitRecord>>,
}

impl InMemoryRateLimitStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, key: &str) -> Option<RateLimitRecord> {
        self.records.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, record: RateLimitRecord) {
        self.records.write().await.insert(key.to_string(), record);
    }

    async fn remove(&self, key: &str) {
        self.records.write().await.remove(key);
    }

    async fn expire_before(&self, cutoff: DateTime<Utc>) {
        self.records
            .write()
            .await
            .retain(|_, record| record.window_start >= cutoff);
    }
}

/// Fixed-window rate limiter
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    /// Create a limiter with the in-memory store
    pub fn new(window_secs: i64, max_requests: u32) -> Self {
        Self::with_store(Arc::new(InMemoryRateLimitStore::new()), window_secs, max_requests)
    }

    /// Create a limiter over an injected store
    pub fn with_store(store: Arc<dyn RateLimitStore>, window_secs: i64, max_requests: u32) -> Self {
        Self {
            store,
            window: Duration::seconds(window_secs),
            max_requests,
        }
    }

    /// Check the quota for a client and count the request if admitted.
    ///
    /// A missing or expired record starts a fresh window at the current
    /// instant. At quota, the request is rejected without incrementing.
    /// Never fails; always returns one of the two decisions.
    pub async fn check_and_record(&self, client_id: &str) -> RateLimitDecision {
        let now = Utc::now();

        let mut record = match self.store.get(client_id).await {
            Some(record) if now - record.window_start <= self.window => record,
            _ => RateLimitRecord {
                window_start: now,
                count: 0,
            },
        };

        if record.count >= self.max_requests {
            let retry_after_secs = (record.window_start + self.window - now).num_seconds().max(0);
            return RateLimitDecision::Rejected { retry_after_secs };
        }

        record.count += 1;
        self.store.set(client_id, record).await;
        RateLimitDecision::Admitted
    }

    /// Drop expired windows (called periodically from a background task)
    pub async fn cleanup(&self) {
        self.store.expire_before(Utc::now() - self.window).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter_with_store(window_secs: i64, max: u32) -> (Arc<InMemoryRateLimitStore>, RateLimiter) {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let limiter = RateLimiter::with_store(store.clone(), window_secs, max);
        (store, limiter)
    }

    #[tokio::test]
    async fn test_admits_up_to_quota() {
        let limiter = RateLimiter::new(3600, 5);

        for _ in 0..5 {
            assert_eq!(
                limiter.check_and_record("1.2.3.4").await,
                RateLimitDecision::Admitted
            );
        }

        assert!(matches!(
            limiter.check_and_record("1.2.3.4").await,
            RateLimitDecision::Rejected { .. }
        ));
    }

    #[tokio::test]
    async fn test_rejection_does_not_increment() {
        let (store, limiter) = limiter_with_store(3600, 2);

        limiter.check_and_record("c").await;
        limiter.check_and_record("c").await;
        limiter.check_and_record("c").await;
        limiter.check_and_record("c").await;

        let record = store.get("c").await.expect("record missing");
        assert_eq!(record.count, 2);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = RateLimiter::new(3600, 1);

        assert_eq!(
            limiter.check_and_record("a").await,
            RateLimitDecision::Admitted
        );
        assert_eq!(
            limiter.check_and_record("b").await,
            RateLimitDecision::Admitted
        );
        assert!(matches!(
            limiter.check_and_record("a").await,
            RateLimitDecision::Rejected { .. }
        ));
    }

    #[tokio::test]
    async fn test_window_reset_after_expiry() {
        let (store, limiter) = limiter_with_store(3600, 2);

        // Simulate an exhausted window that started over an hour ago
        store
            .set(
                "c",
                RateLimitRecord {
                    window_start: Utc::now() - Duration::seconds(3601),
                    count: 2,
                },
            )
            .await;

        assert_eq!(
            limiter.check_and_record("c").await,
            RateLimitDecision::Admitted
        );

        // Fresh window counts from 1
        let record = store.get("c").await.expect("record missing");
        assert_eq!(record.count, 1);
    }

    #[tokio::test]
    async fn test_rejected_reports_retry_after() {
        let limiter = RateLimiter::new(3600, 1);
        limiter.check_and_record("c").await;

        match limiter.check_and_record("c").await {
            RateLimitDecision::Rejected { retry_after_secs } => {
                assert!(retry_after_secs > 0 && retry_after_secs <= 3600);
            }
            RateLimitDecision::Admitted => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_windows() {
        let (store, limiter) = limiter_with_store(3600, 5);

        store
            .set(
                "stale",
                RateLimitRecord {
                    window_start: Utc::now() - Duration::seconds(7200),
                    count: 3,
                },
            )
            .await;
        store
            .set(
                "fresh",
                RateLimitRecord {
                    window_start: Utc::now(),
                    count: 1,
                },
            )
            .await;

        limiter.cleanup().await;

        assert!(store.get("stale").await.is_none());
        assert!(store.get("fresh").await.is_some());
    }
}
