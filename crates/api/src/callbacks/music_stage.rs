//! Music stage processor.
//!
//! A state machine keyed by the callback's stage (`text`, `first`,
//! `complete`) and result code. Stages can arrive out of order and more
//! than once; every write below is either an upsert keyed by (job, side)
//! or a guarded targeted update, so interleaving never regresses a job.

use songforge_core::{lyrics, naming, stage};
use songforge_db::models::generation_error::CreateGenerationError;
use songforge_db::models::track::UpsertStreamTrack;
use songforge_db::repositories::{
    GenerationErrorRepo, GenerationJobRepo, LyricsRepo, TrackRepo,
};
use songforge_provider::{MusicCallback, TrackVariant};

use super::{cover_trigger, refund, CallbackContext, StageError};

/// Process one music webhook delivery.
///
/// Returns `Err` only for failures that must abort the remaining steps;
/// everything else is logged and survived (the HTTP response is long gone).
pub async fn process(ctx: &CallbackContext, callback: MusicCallback) -> Result<(), StageError> {
    let Some(task_id) = callback
        .data
        .task_id
        .clone()
        .filter(|t| !t.trim().is_empty())
    else {
        tracing::warn!("Music callback without taskId reached the processor, dropping");
        return Ok(());
    };

    if callback.code != stage::CODE_SUCCESS {
        return handle_failure(ctx, &task_id, callback.code, &callback.msg).await;
    }

    let variants = callback.data.data.unwrap_or_default();
    match callback.data.callback_type.as_deref() {
        Some(stage::STAGE_TEXT) => handle_text(ctx, &task_id, &variants).await,
        Some(stage::STAGE_FIRST) => handle_first(ctx, &task_id, &variants).await,
        Some(stage::STAGE_COMPLETE) => handle_complete(ctx, &task_id, &variants).await,
        other => {
            tracing::warn!(task_id, stage = ?other, "Unknown music callback stage, ignoring");
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Stage: text
// ---------------------------------------------------------------------------

/// Lyrics and streaming previews are ready; no final audio yet.
async fn handle_text(
    ctx: &CallbackContext,
    task_id: &str,
    variants: &[TrackVariant],
) -> Result<(), StageError> {
    if variants.is_empty() {
        tracing::warn!(task_id, "Text stage delivered without variants, nothing to persist");
        return Ok(());
    }

    let first = &variants[0];
    let title = lyrics::derive_title(first.title.as_deref(), first.prompt.as_deref());

    GenerationJobRepo::upsert_text_fields(
        &ctx.pool,
        task_id,
        title.as_deref(),
        first.tags.as_deref(),
    )
    .await?;

    if !GenerationJobRepo::advance_status(&ctx.pool, task_id, stage::STATUS_TEXT).await? {
        tracing::debug!(task_id, "Job already past text, leaving status untouched");
    }

    // First write wins; redelivered text stages hit the unique constraint.
    if let Some(prompt) = first.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
        if let Err(e) = LyricsRepo::create_if_absent(&ctx.pool, task_id, prompt).await {
            tracing::error!(task_id, error = %e, "Failed to persist lyrics record");
        }
    }

    for (index, variant) in variants.iter().enumerate() {
        let side = naming::side_letter(index).to_string();
        let input = UpsertStreamTrack {
            job_task_id: task_id.to_string(),
            provider_track_id: variant.id.clone(),
            side: side.clone(),
            stream_audio_url: variant.stream_url().map(str::to_string),
            duration_secs: variant.duration,
        };
        if let Err(e) = TrackRepo::upsert_stream(&ctx.pool, &input).await {
            tracing::error!(task_id, side, error = %e, "Failed to upsert streaming track");
        }
    }

    // Exactly once per job; duplicate text deliveries are absorbed by the
    // trigger's own idempotency key.
    cover_trigger::trigger_cover_once(ctx, task_id).await;

    tracing::info!(task_id, variant_count = variants.len(), "Text stage persisted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Stage: first
// ---------------------------------------------------------------------------

/// At least one variant should now carry final audio. Variants without
/// audio are expected (partial readiness) and simply skipped.
async fn handle_first(
    ctx: &CallbackContext,
    task_id: &str,
    variants: &[TrackVariant],
) -> Result<(), StageError> {
    let ready: Vec<(usize, &TrackVariant)> = variants
        .iter()
        .enumerate()
        .filter(|(_, v)| v.has_final_audio())
        .collect();

    if ready.is_empty() {
        tracing::debug!(task_id, "First stage with no audio-ready variants yet, waiting");
        return Ok(());
    }

    let title = GenerationJobRepo::find_by_task_id(&ctx.pool, task_id)
        .await?
        .and_then(|job| job.title);

    for (index, variant) in ready {
        relocate_and_store(ctx, task_id, title.as_deref(), index, variant).await;
    }

    if !GenerationJobRepo::advance_status(&ctx.pool, task_id, stage::STATUS_FIRST).await? {
        tracing::debug!(task_id, "Job already past first, leaving status untouched");
    }

    tracing::info!(task_id, "First stage persisted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Stage: complete
// ---------------------------------------------------------------------------

/// Every variant must carry final audio and the persisted track count must
/// match before the job may flip to `complete`.
async fn handle_complete(
    ctx: &CallbackContext,
    task_id: &str,
    variants: &[TrackVariant],
) -> Result<(), StageError> {
    if variants.is_empty() {
        tracing::warn!(task_id, "Complete stage delivered without variants, ignoring");
        return Ok(());
    }

    if !variants.iter().all(TrackVariant::has_final_audio) {
        tracing::info!(
            task_id,
            "Complete stage with missing audio URLs, waiting for a later delivery"
        );
        return Ok(());
    }

    let persisted = TrackRepo::count_for_job(&ctx.pool, task_id).await?;
    if persisted != variants.len() as i64 {
        tracing::error!(
            task_id,
            persisted,
            delivered = variants.len(),
            "Track count mismatch at complete stage, aborting without transition"
        );
        return Ok(());
    }

    let title = GenerationJobRepo::find_by_task_id(&ctx.pool, task_id)
        .await?
        .and_then(|job| job.title);

    for (index, variant) in variants.iter().enumerate() {
        relocate_and_store(ctx, task_id, title.as_deref(), index, variant).await;
    }

    // A failure here would leave a functionally finished job invisibly
    // stuck between states, so it escalates instead of being swallowed.
    if !GenerationJobRepo::advance_status(&ctx.pool, task_id, stage::STATUS_COMPLETE).await? {
        tracing::debug!(task_id, "Job already terminal, complete transition skipped");
    }

    tracing::info!(task_id, "Complete stage persisted");
    Ok(())
}

/// Relocate one variant's final audio and record the durable URL.
///
/// Both the relocation and the track update are best-effort per variant:
/// a failure leaves this track's durable fields unset (readers fall back
/// to the streaming URL) and siblings are still processed.
async fn relocate_and_store(
    ctx: &CallbackContext,
    task_id: &str,
    title: Option<&str>,
    index: usize,
    variant: &TrackVariant,
) {
    let Some(source_url) = variant.final_audio_url() else {
        return;
    };
    let side = naming::side_letter(index).to_string();
    let key = naming::audio_object_key(task_id, title, index);

    let durable_url = match ctx.relocator.relocate(source_url, &key).await {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(task_id, side, error = %e, "Audio relocation failed, leaving track on streaming URL");
            return;
        }
    };

    if let Err(e) =
        TrackRepo::set_durable_audio(&ctx.pool, task_id, &side, &durable_url, variant.duration)
            .await
    {
        tracing::error!(task_id, side, error = %e, "Failed to record durable audio URL");
    }
}

// ---------------------------------------------------------------------------
// Failure family (any stage, code != 200)
// ---------------------------------------------------------------------------

/// Terminal failure: mark the job errored, record the provider message,
/// and refund the debited credits. Each sub-step is independently guarded
/// so one failing leg never blocks the others.
async fn handle_failure(
    ctx: &CallbackContext,
    task_id: &str,
    code: i64,
    msg: &str,
) -> Result<(), StageError> {
    let kind = stage::FailureKind::classify(code);
    tracing::warn!(task_id, code, kind = kind.error_tag(), msg, "Provider reported job failure");

    let job = match GenerationJobRepo::find_by_task_id(&ctx.pool, task_id).await {
        Ok(job) => job,
        Err(e) => {
            tracing::error!(task_id, error = %e, "Failed to load job during failure handling");
            None
        }
    };

    // The original prompt doubles as a readable title for the failed job.
    let fallback_title = job.as_ref().and_then(|j| j.prompt.clone());
    if let Err(e) =
        GenerationJobRepo::mark_error(&ctx.pool, task_id, fallback_title.as_deref()).await
    {
        tracing::error!(task_id, error = %e, "Failed to mark job as errored");
    }

    let record = CreateGenerationError {
        job_task_id: task_id.to_string(),
        error_code: kind.error_tag().to_string(),
        message: Some(msg.to_string()).filter(|m| !m.is_empty()),
    };
    if let Err(e) = GenerationErrorRepo::create(&ctx.pool, &record).await {
        tracing::error!(task_id, error = %e, "Failed to write generation error record");
    }

    let user_id = job.as_ref().and_then(|j| j.user_id);
    if let Err(e) = refund::refund_for_failed_job(&ctx.pool, task_id, user_id).await {
        tracing::error!(task_id, error = %e, "Credit refund failed");
    }

    Ok(())
}
