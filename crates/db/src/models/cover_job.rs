//! Cover job entity model.
//!
//! A cover job has its own provider `task_id` and points back to the music
//! job it illustrates via `music_task_id`.

use serde::Serialize;
use songforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `cover_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CoverJob {
    pub id: DbId,
    pub task_id: String,
    pub music_task_id: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
