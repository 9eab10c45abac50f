//! Generation job entity model and DTOs.
//!
//! A job is identified by the provider-issued `task_id`; the BIGSERIAL `id`
//! exists only for ordering and foreign-key hygiene. Rows are created by the
//! request side and mutated exclusively by the music stage processor.

use serde::{Deserialize, Serialize};
use songforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `generation_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationJob {
    pub id: DbId,
    pub task_id: String,
    pub user_id: Option<DbId>,
    pub title: Option<String>,
    pub tags: Option<String>,
    pub prompt: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new generation job (request side / tests).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGenerationJob {
    pub task_id: String,
    pub user_id: Option<DbId>,
    pub prompt: Option<String>,
}
