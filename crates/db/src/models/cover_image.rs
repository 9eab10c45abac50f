//! Cover image entity model and DTO.

use serde::{Deserialize, Serialize};
use songforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `cover_images` table.
///
/// `image_url` may be the provider's ephemeral URL: covers are persisted
/// as delivered so the UI has something to show immediately, and no later
/// relocation pass exists for them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CoverImage {
    pub id: DbId,
    pub cover_task_id: String,
    pub track_side: Option<String>,
    pub image_url: String,
    pub file_name: String,
    pub created_at: Timestamp,
}

/// DTO for creating a cover image row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCoverImage {
    pub cover_task_id: String,
    pub track_side: Option<String>,
    pub image_url: String,
    pub file_name: String,
}
