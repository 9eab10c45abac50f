//! Once-per-job cover art kickoff.
//!
//! Fired from the text stage, when lyrics and a title first exist. Cover
//! art is decorative: every failure here is logged and dropped so it can
//! never disturb the music pipeline.

use songforge_core::credits;
use songforge_db::repositories::{CoverJobRepo, GenerationJobRepo};

use super::idempotency::IdempotencyGuard;
use super::CallbackContext;

/// Ask the provider for cover art for `music_task_id`, at most once.
pub async fn trigger_cover_once(ctx: &CallbackContext, music_task_id: &str) {
    let key = IdempotencyGuard::cover_trigger_key(music_task_id);
    if !ctx.guard.try_mark(&key).await {
        tracing::debug!(music_task_id, "Cover already triggered for this job");
        return;
    }

    let user_id = match GenerationJobRepo::find_by_task_id(&ctx.pool, music_task_id).await {
        Ok(Some(job)) => job.user_id.unwrap_or(credits::ANONYMOUS_USER_ID),
        Ok(None) => credits::ANONYMOUS_USER_ID,
        Err(e) => {
            tracing::error!(music_task_id, error = %e, "Failed to load job for cover trigger");
            credits::ANONYMOUS_USER_ID
        }
    };

    let cover_task_id = match ctx.cover_service.create_cover_job(music_task_id, user_id).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(music_task_id, error = %e, "Cover job creation failed");
            return;
        }
    };

    if let Err(e) = CoverJobRepo::create(&ctx.pool, &cover_task_id, music_task_id).await {
        tracing::error!(
            music_task_id,
            cover_task_id,
            error = %e,
            "Cover job accepted by provider but not recorded"
        );
        return;
    }

    tracing::info!(music_task_id, cover_task_id, "Cover job triggered");
}
