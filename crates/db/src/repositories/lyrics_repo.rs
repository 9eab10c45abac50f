//! Repository for the `lyrics` table. First write wins.

use sqlx::PgPool;

use crate::models::lyrics::Lyrics;

const COLUMNS: &str = "id, job_task_id, content, created_at";

/// Provides access to job lyrics records.
pub struct LyricsRepo;

impl LyricsRepo {
    /// Create the lyrics record for a job unless one already exists.
    ///
    /// Returns `true` when a row was inserted. Redeliveries of the text
    /// stage hit the unique constraint and are a no-op.
    pub async fn create_if_absent(
        pool: &PgPool,
        job_task_id: &str,
        content: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO lyrics (job_task_id, content) VALUES ($1, $2) \
             ON CONFLICT (job_task_id) DO NOTHING",
        )
        .bind(job_task_id)
        .bind(content)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the lyrics record for a job.
    pub async fn find_by_job(
        pool: &PgPool,
        job_task_id: &str,
    ) -> Result<Option<Lyrics>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lyrics WHERE job_task_id = $1");
        sqlx::query_as::<_, Lyrics>(&query)
            .bind(job_task_id)
            .fetch_optional(pool)
            .await
    }
}
