//! Short-lived cache of cover job outcomes for the polling read endpoint.
//!
//! Every cover stage outcome is recorded here keyed by the cover task id,
//! so `GET /callbacks/cover/result` can answer without re-deriving state
//! from the ledger. Entries expire after a fixed retention window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;

/// How long a cover outcome stays queryable.
pub const RESULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Final (or informational) outcome of a cover job.
#[derive(Debug, Clone, Serialize)]
pub struct CoverOutcome {
    pub task_id: String,
    /// `complete`, `conflict`, or `error`.
    pub status: String,
    pub music_task_id: Option<String>,
    pub images: Vec<String>,
    pub message: Option<String>,
}

/// TTL-backed map of cover task id to outcome.
pub struct CoverResultCache {
    retention: Duration,
    entries: Mutex<HashMap<String, (CoverOutcome, Instant)>>,
}

impl CoverResultCache {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_retention() -> Self {
        Self::new(RESULT_RETENTION)
    }

    /// Record (or overwrite) the outcome for a cover task.
    pub async fn insert(&self, outcome: CoverOutcome) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, at)| now.duration_since(*at) < self.retention);
        entries.insert(outcome.task_id.clone(), (outcome, now));
    }

    /// Fetch the cached outcome for a cover task, if still retained.
    pub async fn get(&self, task_id: &str) -> Option<CoverOutcome> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(task_id) {
            Some((_, at)) if now.duration_since(*at) >= self.retention => {
                entries.remove(task_id);
                None
            }
            Some((outcome, _)) => Some(outcome.clone()),
            None => None,
        }
    }
}
