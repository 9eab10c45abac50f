//! Cover stage processor.
//!
//! Cover jobs have a single result delivery. Success persists the image
//! URLs as delivered (no relocation pass exists for covers), pairing each
//! image with a track side by position; every outcome is also pushed into
//! the in-memory result cache for the polling endpoint.

use songforge_core::{naming, stage};
use songforge_db::models::cover_image::CreateCoverImage;
use songforge_db::repositories::{CoverImageRepo, CoverJobRepo, TrackRepo};
use songforge_provider::CoverCallback;

use super::result_cache::CoverOutcome;
use super::{CallbackContext, StageError};

/// Process one cover webhook delivery.
pub async fn process(ctx: &CallbackContext, callback: CoverCallback) -> Result<(), StageError> {
    let Some(task_id) = callback
        .data
        .task_id
        .clone()
        .filter(|t| !t.trim().is_empty())
    else {
        tracing::warn!("Cover callback without taskId reached the processor, dropping");
        return Ok(());
    };

    match callback.code {
        stage::CODE_SUCCESS => handle_success(ctx, &task_id, &callback.data.images).await,
        // 400 here means the provider already has cover art for this music
        // task. Informational: existing state stays untouched.
        400 => handle_conflict(ctx, &task_id, &callback.msg).await,
        code => handle_error(ctx, &task_id, code, &callback.msg).await,
    }
}

async fn handle_success(
    ctx: &CallbackContext,
    task_id: &str,
    images: &[String],
) -> Result<(), StageError> {
    let cover_job = CoverJobRepo::find_by_task_id(&ctx.pool, task_id).await?;
    let Some(cover_job) = cover_job else {
        tracing::warn!(task_id, "Cover result for an unknown cover job, caching outcome only");
        cache_outcome(ctx, task_id, "complete", None, images.to_vec(), None).await;
        return Ok(());
    };

    let tracks = TrackRepo::list_for_job(&ctx.pool, &cover_job.music_task_id).await?;
    if images.len() != tracks.len() {
        tracing::warn!(
            task_id,
            images = images.len(),
            tracks = tracks.len(),
            "Cover image count does not match track count, pairing by position anyway"
        );
    }

    for (index, image_url) in images.iter().enumerate() {
        let input = CreateCoverImage {
            cover_task_id: task_id.to_string(),
            track_side: tracks.get(index).map(|t| t.side.clone()),
            image_url: image_url.clone(),
            file_name: naming::cover_file_name(task_id, index),
        };
        if let Err(e) = CoverImageRepo::create(&ctx.pool, &input).await {
            tracing::error!(task_id, index, error = %e, "Failed to persist cover image");
        }
    }

    if let Err(e) = CoverJobRepo::set_status(&ctx.pool, task_id, stage::COVER_COMPLETE).await {
        tracing::error!(task_id, error = %e, "Failed to mark cover job complete");
    }

    cache_outcome(
        ctx,
        task_id,
        "complete",
        Some(cover_job.music_task_id),
        images.to_vec(),
        None,
    )
    .await;

    tracing::info!(task_id, image_count = images.len(), "Cover result persisted");
    Ok(())
}

async fn handle_conflict(
    ctx: &CallbackContext,
    task_id: &str,
    msg: &str,
) -> Result<(), StageError> {
    tracing::info!(task_id, msg, "Cover already exists for this music task");

    let music_task_id = CoverJobRepo::find_by_task_id(&ctx.pool, task_id)
        .await?
        .map(|job| job.music_task_id);

    cache_outcome(
        ctx,
        task_id,
        "conflict",
        music_task_id,
        Vec::new(),
        Some(msg.to_string()).filter(|m| !m.is_empty()),
    )
    .await;
    Ok(())
}

async fn handle_error(
    ctx: &CallbackContext,
    task_id: &str,
    code: i64,
    msg: &str,
) -> Result<(), StageError> {
    tracing::warn!(task_id, code, msg, "Cover generation failed");

    let music_task_id = match CoverJobRepo::find_by_task_id(&ctx.pool, task_id).await {
        Ok(job) => job.map(|j| j.music_task_id),
        Err(e) => {
            tracing::error!(task_id, error = %e, "Failed to load cover job during error handling");
            None
        }
    };

    if let Err(e) = CoverJobRepo::set_status(&ctx.pool, task_id, stage::COVER_ERROR).await {
        tracing::error!(task_id, error = %e, "Failed to mark cover job errored");
    }

    cache_outcome(
        ctx,
        task_id,
        "error",
        music_task_id,
        Vec::new(),
        Some(msg.to_string()).filter(|m| !m.is_empty()),
    )
    .await;
    Ok(())
}

async fn cache_outcome(
    ctx: &CallbackContext,
    task_id: &str,
    status: &str,
    music_task_id: Option<String>,
    images: Vec<String>,
    message: Option<String>,
) {
    ctx.cover_results
        .insert(CoverOutcome {
            task_id: task_id.to_string(),
            status: status.to_string(),
            music_task_id,
            images,
            message,
        })
        .await;
}
