//! Repository for the `cover_images` table.

use sqlx::PgPool;

use crate::models::cover_image::{CoverImage, CreateCoverImage};

const COLUMNS: &str = "id, cover_task_id, track_side, image_url, file_name, created_at";

/// Provides access to generated cover images.
pub struct CoverImageRepo;

impl CoverImageRepo {
    /// Insert a cover image row.
    ///
    /// `image_url` is stored exactly as delivered. It may be the provider's
    /// ephemeral URL; covers are not relocated after persistence.
    pub async fn create(pool: &PgPool, input: &CreateCoverImage) -> Result<CoverImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO cover_images (cover_task_id, track_side, image_url, file_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CoverImage>(&query)
            .bind(&input.cover_task_id)
            .bind(&input.track_side)
            .bind(&input.image_url)
            .bind(&input.file_name)
            .fetch_one(pool)
            .await
    }

    /// List images for a cover job, oldest first.
    pub async fn list_for_cover(
        pool: &PgPool,
        cover_task_id: &str,
    ) -> Result<Vec<CoverImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cover_images WHERE cover_task_id = $1 ORDER BY id");
        sqlx::query_as::<_, CoverImage>(&query)
            .bind(cover_task_id)
            .fetch_all(pool)
            .await
    }
}
