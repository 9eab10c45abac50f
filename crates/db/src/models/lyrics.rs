//! Lyrics entity model. One row per job, first write wins.

use serde::Serialize;
use songforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `lyrics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lyrics {
    pub id: DbId,
    pub job_task_id: String,
    pub content: String,
    pub created_at: Timestamp,
}
