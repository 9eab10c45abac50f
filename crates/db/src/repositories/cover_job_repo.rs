//! Repository for the `cover_jobs` table.

use sqlx::PgPool;

use crate::models::cover_job::CoverJob;

const COLUMNS: &str = "id, task_id, music_task_id, status, created_at, updated_at";

/// Provides access to cover generation jobs.
pub struct CoverJobRepo;

impl CoverJobRepo {
    /// Insert a new cover job in `generating` status.
    ///
    /// Idempotent on `task_id`: a redelivered trigger updates nothing and
    /// returns the existing row.
    pub async fn create(
        pool: &PgPool,
        task_id: &str,
        music_task_id: &str,
    ) -> Result<CoverJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO cover_jobs (task_id, music_task_id) \
             VALUES ($1, $2) \
             ON CONFLICT (task_id) DO UPDATE SET updated_at = cover_jobs.updated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CoverJob>(&query)
            .bind(task_id)
            .bind(music_task_id)
            .fetch_one(pool)
            .await
    }

    /// Find a cover job by its provider task id.
    pub async fn find_by_task_id(
        pool: &PgPool,
        task_id: &str,
    ) -> Result<Option<CoverJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cover_jobs WHERE task_id = $1");
        sqlx::query_as::<_, CoverJob>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the cover job attached to a music job, if any.
    pub async fn find_by_music_task_id(
        pool: &PgPool,
        music_task_id: &str,
    ) -> Result<Option<CoverJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cover_jobs WHERE music_task_id = $1 \
             ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, CoverJob>(&query)
            .bind(music_task_id)
            .fetch_optional(pool)
            .await
    }

    /// Set the cover job status. Returns `true` when a row was updated.
    pub async fn set_status(
        pool: &PgPool,
        task_id: &str,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE cover_jobs SET status = $2, updated_at = now() WHERE task_id = $1")
                .bind(task_id)
                .bind(status)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
