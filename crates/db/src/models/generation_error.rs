//! Generation error record model and DTO.

use serde::{Deserialize, Serialize};
use songforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `generation_errors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationError {
    pub id: DbId,
    pub job_task_id: String,
    pub error_code: String,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording a provider-reported failure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGenerationError {
    pub job_task_id: String,
    pub error_code: String,
    pub message: Option<String>,
}
