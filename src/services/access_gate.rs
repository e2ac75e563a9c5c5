//! Access code verification with attempt tracking and lockout
//!
//! The blog's protected reading area sits behind a shared access code.
//! Each client gets a bounded number of wrong guesses inside a rolling
//! window; exhausting them locks the client out for a fixed period.
//! A correct code clears the client's attempt history entirely.
//!
//! Like the rate limiter, state sits behind a store trait with an
//! in-memory default, so the gate carries no database dependency.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-client failed attempt history
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// Failed attempts in the current window
    pub count: u32,
    /// Instant of the most recent failed attempt
    pub last_attempt_at: DateTime<Utc>,
    /// Set once the attempt budget is exhausted
    pub locked_until: Option<DateTime<Utc>>,
}

/// Outcome of an access code verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Code matched; attempt history cleared
    Granted,
    /// Code did not match
    Denied {
        /// Wrong guesses left before lockout
        remaining: u32,
    },
    /// Client is locked out; the attempt was not evaluated
    LockedOut {
        /// Seconds until the lockout expires
        retry_after_secs: i64,
    },
}

/// Key-value backing store for attempt records
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Fetch the record for a client, if any
    async fn get(&self, key: &str) -> Option<AttemptRecord>;

    /// Store or replace the record for a client
    async fn set(&self, key: &str, record: AttemptRecord);

    /// Drop the record for a client
    async fn remove(&self, key: &str);

    /// Drop records idle since before `cutoff` and not currently locked
    async fn expire_before(&self, cutoff: DateTime<Utc>);
}

/// In-memory store backed by a process-wide map
#[derive(Default)]
pub struct InMemoryAttemptStore {
    records: RwLock<HashMap<String, AttemptRecord>>,
}

impl InMemoryAttemptStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptStore for InMemoryAttemptStore {
    async fn get(&self, key: &str) -> Option<AttemptRecord> {
        self.records.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, record: AttemptRecord) {
        self.records.write().await.insert(key.to_string(), record);
    }

    async fn remove(&self, key: &str) {
        self.records.write().await.remove(key);
    }

    async fn expire_before(&self, cutoff: DateTime<Utc>) {
        let now = Utc::now();
        self.records.write().await.retain(|_, record| {
            let locked = record.locked_until.map(|until| until > now).unwrap_or(false);
            locked || record.last_attempt_at >= cutoff
        });
    }
}

/// Access code gate with per-client lockout
pub struct AccessGate {
    store: Arc<dyn AttemptStore>,
    access_code: String,
    max_attempts: u32,
    lockout: Duration,
}

impl AccessGate {
    /// Create a gate with the in-memory store
    pub fn new(access_code: impl Into<String>, max_attempts: u32, lockout_minutes: i64) -> Self {
        Self::with_store(
            Arc::new(InMemoryAttemptStore::new()),
            access_code,
            max_attempts,
            lockout_minutes,
        )
    }

    /// Create a gate over an injected store
    pub fn with_store(
        store: Arc<dyn AttemptStore>,
        access_code: impl Into<String>,
        max_attempts: u32,
        lockout_minutes: i64,
    ) -> Self {
        Self {
            store,
            access_code: access_code.into(),
            max_attempts,
            lockout: Duration::minutes(lockout_minutes),
        }
    }

    /// Verify a submitted code for a client.
    ///
    /// An active lockout short-circuits without evaluating the code or
    /// consuming an attempt. An expired lockout is evicted lazily, as
    /// is a stale attempt window (last failure older than the lockout
    /// period). A correct code clears the record.
    pub async fn verify(&self, client_id: &str, code: &str) -> AccessOutcome {
        let now = Utc::now();

        let mut record = match self.store.get(client_id).await {
            Some(record) => {
                if let Some(locked_until) = record.locked_until {
                    if locked_until > now {
                        let retry_after_secs = (locked_until - now).num_seconds().max(0);
                        return AccessOutcome::LockedOut { retry_after_secs };
                    }
                    // Lockout has lapsed; start over
                    self.store.remove(client_id).await;
                    AttemptRecord {
                        count: 0,
                        last_attempt_at: now,
                        locked_until: None,
                    }
                } else if now - record.last_attempt_at > self.lockout {
                    // Stale window; prior failures no longer count
                    AttemptRecord {
                        count: 0,
                        last_attempt_at: now,
                        locked_until: None,
                    }
                } else {
                    record
                }
            }
            None => AttemptRecord {
                count: 0,
                last_attempt_at: now,
                locked_until: None,
            },
        };

        if code == self.access_code {
            self.store.remove(client_id).await;
            return AccessOutcome::Granted;
        }

        record.count += 1;
        record.last_attempt_at = now;

        if record.count >= self.max_attempts {
            let locked_until = now + self.lockout;
            record.locked_until = Some(locked_until);
            self.store.set(client_id, record).await;
            let retry_after_secs = (locked_until - now).num_seconds().max(0);
            return AccessOutcome::LockedOut { retry_after_secs };
        }

        let remaining = self.max_attempts - record.count;
        self.store.set(client_id, record).await;
        AccessOutcome::Denied { remaining }
    }

    /// Drop stale, unlocked records (called periodically)
    pub async fn cleanup(&self) {
        self.store.expire_before(Utc::now() - self.lockout).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: &str = "070605";

    fn gate_with_store() -> (Arc<InMemoryAttemptStore>, AccessGate) {
        let store = Arc::new(InMemoryAttemptStore::new());
        let gate = AccessGate::with_store(store.clone(), CODE, 5, 15);
        (store, gate)
    }

    #[tokio::test]
    async fn test_correct_code_granted() {
        let gate = AccessGate::new(CODE, 5, 15);
        assert_eq!(gate.verify("c", CODE).await, AccessOutcome::Granted);
    }

    #[tokio::test]
    async fn test_wrong_code_counts_down_remaining() {
        let gate = AccessGate::new(CODE, 5, 15);

        assert_eq!(
            gate.verify("c", "000000").await,
            AccessOutcome::Denied { remaining: 4 }
        );
        assert_eq!(
            gate.verify("c", "000000").await,
            AccessOutcome::Denied { remaining: 3 }
        );
    }

    #[tokio::test]
    async fn test_lockout_on_fifth_failure() {
        let gate = AccessGate::new(CODE, 5, 15);

        for _ in 0..4 {
            assert!(matches!(
                gate.verify("c", "wrong").await,
                AccessOutcome::Denied { .. }
            ));
        }

        match gate.verify("c", "wrong").await {
            AccessOutcome::LockedOut { retry_after_secs } => {
                assert!(retry_after_secs > 0 && retry_after_secs <= 15 * 60);
            }
            other => panic!("expected lockout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_locked_out_even_with_correct_code() {
        let gate = AccessGate::new(CODE, 5, 15);

        for _ in 0..5 {
            gate.verify("c", "wrong").await;
        }

        assert!(matches!(
            gate.verify("c", CODE).await,
            AccessOutcome::LockedOut { .. }
        ));
    }

    #[tokio::test]
    async fn test_success_clears_attempt_history() {
        let (store, gate) = gate_with_store();

        gate.verify("c", "wrong").await;
        gate.verify("c", "wrong").await;
        assert_eq!(gate.verify("c", CODE).await, AccessOutcome::Granted);
        assert!(store.get("c").await.is_none());

        // Counter starts fresh after success
        assert_eq!(
            gate.verify("c", "wrong").await,
            AccessOutcome::Denied { remaining: 4 }
        );
    }

    #[tokio::test]
    async fn test_expired_lockout_allows_retry() {
        let (store, gate) = gate_with_store();

        store
            .set(
                "c",
                AttemptRecord {
                    count: 5,
                    last_attempt_at: Utc::now() - Duration::minutes(16),
                    locked_until: Some(Utc::now() - Duration::minutes(1)),
                },
            )
            .await;

        assert_eq!(gate.verify("c", CODE).await, AccessOutcome::Granted);
    }

    #[tokio::test]
    async fn test_stale_failures_reset_counter() {
        let (store, gate) = gate_with_store();

        store
            .set(
                "c",
                AttemptRecord {
                    count: 4,
                    last_attempt_at: Utc::now() - Duration::minutes(16),
                    locked_until: None,
                },
            )
            .await;

        // Old failures no longer count toward lockout
        assert_eq!(
            gate.verify("c", "wrong").await,
            AccessOutcome::Denied { remaining: 4 }
        );
    }

    #[tokio::test]
    async fn test_clients_tracked_independently() {
        let gate = AccessGate::new(CODE, 5, 15);

        for _ in 0..5 {
            gate.verify("a", "wrong").await;
        }

        assert!(matches!(
            gate.verify("a", CODE).await,
            AccessOutcome::LockedOut { .. }
        ));
        assert_eq!(gate.verify("b", CODE).await, AccessOutcome::Granted);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_locked_records() {
        let (store, gate) = gate_with_store();

        store
            .set(
                "locked",
                AttemptRecord {
                    count: 5,
                    last_attempt_at: Utc::now() - Duration::minutes(30),
                    locked_until: Some(Utc::now() + Duration::minutes(5)),
                },
            )
            .await;
        store
            .set(
                "stale",
                AttemptRecord {
                    count: 2,
                    last_attempt_at: Utc::now() - Duration::minutes(30),
                    locked_until: None,
                },
            )
            .await;

        gate.cleanup().await;

        assert!(store.get("locked").await.is_some());
        assert!(store.get("stale").await.is_none());
    }
}
