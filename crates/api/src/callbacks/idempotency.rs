//! Webhook delivery dedup.
//!
//! The provider redelivers webhooks, sometimes many times. Each delivery is
//! reduced to a key — `(taskId, stage, code)` for music, `(taskId, code)`
//! for cover — and marked here before any heavy work; a key that is already
//! marked means the delivery is acknowledged without reprocessing.
//!
//! Entries carry a TTL and expire on access, so the map cannot grow without
//! bound across a long-lived process. The guard is still per-process: the
//! refund path keeps its own durable check (`CreditRepo::has_refund_for_reference`)
//! for redeliveries that arrive after a restart.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// How long a marked delivery key is remembered.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// TTL-backed set of already-processed delivery keys.
pub struct IdempotencyGuard {
    ttl: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl IdempotencyGuard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_RETENTION)
    }

    /// Mark `key` as seen. Returns `true` when the key was newly marked,
    /// `false` when it is already marked and unexpired (a duplicate).
    pub async fn try_mark(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut seen = self.seen.lock().await;
        seen.retain(|_, marked_at| now.duration_since(*marked_at) < self.ttl);

        if seen.contains_key(key) {
            return false;
        }
        seen.insert(key.to_string(), now);
        true
    }

    /// Forget a key so the same delivery can be accepted again.
    ///
    /// Used when marking succeeded but handing the delivery off did not
    /// (queue full or closed): the provider gets a 500 and redelivers, and
    /// that redelivery must not be swallowed as a duplicate.
    pub async fn unmark(&self, key: &str) {
        self.seen.lock().await.remove(key);
    }

    /// Number of live (unexpired) keys.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let mut seen = self.seen.lock().await;
        seen.retain(|_, marked_at| now.duration_since(*marked_at) < self.ttl);
        seen.len()
    }

    /// Dedup key for a music delivery: task, stage, and result code.
    pub fn music_key(task_id: &str, stage: Option<&str>, code: i64) -> String {
        format!("music:{task_id}:{}:{code}", stage.unwrap_or("-"))
    }

    /// Dedup key for a cover delivery: task and result code.
    pub fn cover_key(task_id: &str, code: i64) -> String {
        format!("cover:{task_id}:{code}")
    }

    /// Dedup key for the once-per-job cover trigger.
    pub fn cover_trigger_key(music_task_id: &str) -> String {
        format!("cover-trigger:{music_task_id}")
    }
}
