//! Repository for the `generation_jobs` table.
//!
//! Status changes are guarded targeted updates: the new status is only
//! written when the persisted status is one of its allowed predecessors
//! (see `songforge_core::stage::allowed_predecessors`), which enforces the
//! forward-only lifecycle even when webhook deliveries interleave.

use sqlx::PgPool;
use songforge_core::stage;

use crate::models::generation_job::{CreateGenerationJob, GenerationJob};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_id, user_id, title, tags, prompt, status, created_at, updated_at";

/// Provides access to music generation jobs.
pub struct GenerationJobRepo;

impl GenerationJobRepo {
    /// Insert a new job in `created` status, returning the created row.
    ///
    /// Used by the request side when a generation is submitted; the
    /// orchestrator itself only mutates existing rows.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGenerationJob,
    ) -> Result<GenerationJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_jobs (task_id, user_id, prompt) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(&input.task_id)
            .bind(input.user_id)
            .bind(&input.prompt)
            .fetch_one(pool)
            .await
    }

    /// Find a job by its provider task id.
    pub async fn find_by_task_id(
        pool: &PgPool,
        task_id: &str,
    ) -> Result<Option<GenerationJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_jobs WHERE task_id = $1");
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    /// Upsert title and tags at the text stage.
    ///
    /// Creates the row if the request side has not persisted it yet (the
    /// provider can deliver callbacks for jobs we have no record of).
    /// Existing non-null values are only overwritten by non-null inputs.
    pub async fn upsert_text_fields(
        pool: &PgPool,
        task_id: &str,
        title: Option<&str>,
        tags: Option<&str>,
    ) -> Result<GenerationJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_jobs (task_id, title, tags) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (task_id) DO UPDATE SET \
                title = COALESCE(EXCLUDED.title, generation_jobs.title), \
                tags = COALESCE(EXCLUDED.tags, generation_jobs.tags), \
                updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationJob>(&query)
            .bind(task_id)
            .bind(title)
            .bind(tags)
            .fetch_one(pool)
            .await
    }

    /// Move a job to `target` status if and only if its persisted status is
    /// an allowed predecessor. Returns `true` when the transition applied.
    pub async fn advance_status(
        pool: &PgPool,
        task_id: &str,
        target: &str,
    ) -> Result<bool, sqlx::Error> {
        let allowed: Vec<String> = stage::allowed_predecessors(target)
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = sqlx::query(
            "UPDATE generation_jobs SET status = $2, updated_at = now() \
             WHERE task_id = $1 AND status = ANY($3)",
        )
        .bind(task_id)
        .bind(target)
        .bind(&allowed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a job failed. A job that never reached the text stage has no
    /// title yet; `fallback_title` (the original prompt) fills it so the
    /// failed job stays readable in listings.
    pub async fn mark_error(
        pool: &PgPool,
        task_id: &str,
        fallback_title: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let allowed: Vec<String> = stage::allowed_predecessors(stage::STATUS_ERROR)
            .iter()
            .map(|s| s.to_string())
            .collect();
        let result = sqlx::query(
            "UPDATE generation_jobs SET \
                status = $2, \
                title = COALESCE(title, $3), \
                updated_at = now() \
             WHERE task_id = $1 AND status = ANY($4)",
        )
        .bind(task_id)
        .bind(stage::STATUS_ERROR)
        .bind(fallback_title)
        .bind(&allowed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
