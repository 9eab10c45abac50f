//! Repository for the `tracks` table.
//!
//! At most one row exists per (job, side letter); every write is an upsert
//! or a targeted column update so out-of-order stage deliveries can only
//! touch the fields their stage owns.

use sqlx::PgPool;

use crate::models::track::{Track, UpsertStreamTrack};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, job_task_id, provider_track_id, side, stream_audio_url, audio_url, \
                       duration_secs, created_at, updated_at";

/// Provides access to job track variants.
pub struct TrackRepo;

impl TrackRepo {
    /// Insert or update the streaming-preview fields for one side.
    ///
    /// The durable `audio_url` is never written here; it belongs to the
    /// first/complete stages after relocation.
    pub async fn upsert_stream(
        pool: &PgPool,
        input: &UpsertStreamTrack,
    ) -> Result<Track, sqlx::Error> {
        let query = format!(
            "INSERT INTO tracks (job_task_id, provider_track_id, side, stream_audio_url, duration_secs) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (job_task_id, side) DO UPDATE SET \
                provider_track_id = COALESCE(EXCLUDED.provider_track_id, tracks.provider_track_id), \
                stream_audio_url = COALESCE(EXCLUDED.stream_audio_url, tracks.stream_audio_url), \
                duration_secs = COALESCE(EXCLUDED.duration_secs, tracks.duration_secs), \
                updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(&input.job_task_id)
            .bind(&input.provider_track_id)
            .bind(&input.side)
            .bind(&input.stream_audio_url)
            .bind(input.duration_secs)
            .fetch_one(pool)
            .await
    }

    /// Set the durable audio URL and duration for one side after a
    /// successful relocation. Inserts the row if the text stage has not
    /// been processed yet (stages can arrive out of order).
    pub async fn set_durable_audio(
        pool: &PgPool,
        job_task_id: &str,
        side: &str,
        audio_url: &str,
        duration_secs: Option<f64>,
    ) -> Result<Track, sqlx::Error> {
        let query = format!(
            "INSERT INTO tracks (job_task_id, side, audio_url, duration_secs) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (job_task_id, side) DO UPDATE SET \
                audio_url = EXCLUDED.audio_url, \
                duration_secs = COALESCE(EXCLUDED.duration_secs, tracks.duration_secs), \
                updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(job_task_id)
            .bind(side)
            .bind(audio_url)
            .bind(duration_secs)
            .fetch_one(pool)
            .await
    }

    /// List all tracks for a job, in side-letter order.
    pub async fn list_for_job(pool: &PgPool, job_task_id: &str) -> Result<Vec<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE job_task_id = $1 ORDER BY side");
        sqlx::query_as::<_, Track>(&query)
            .bind(job_task_id)
            .fetch_all(pool)
            .await
    }

    /// Count persisted tracks for a job.
    pub async fn count_for_job(pool: &PgPool, job_task_id: &str) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tracks WHERE job_task_id = $1")
            .bind(job_task_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
