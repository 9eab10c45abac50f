//! Repository for the `generation_errors` table.

use sqlx::PgPool;

use crate::models::generation_error::{CreateGenerationError, GenerationError};

const COLUMNS: &str = "id, job_task_id, error_code, message, created_at";

/// Provides access to provider failure records.
pub struct GenerationErrorRepo;

impl GenerationErrorRepo {
    /// Record a provider-reported failure for a job.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGenerationError,
    ) -> Result<GenerationError, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_errors (job_task_id, error_code, message) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationError>(&query)
            .bind(&input.job_task_id)
            .bind(&input.error_code)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// List error records for a job, oldest first.
    pub async fn list_for_job(
        pool: &PgPool,
        job_task_id: &str,
    ) -> Result<Vec<GenerationError>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM generation_errors WHERE job_task_id = $1 ORDER BY id");
        sqlx::query_as::<_, GenerationError>(&query)
            .bind(job_task_id)
            .fetch_all(pool)
            .await
    }

    /// Count error records for a job.
    pub async fn count_for_job(pool: &PgPool, job_task_id: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM generation_errors WHERE job_task_id = $1")
                .bind(job_task_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
