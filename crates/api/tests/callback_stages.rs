//! Integration tests for the stage processors, driven directly against a
//! real Postgres with the provider and media seams stubbed.

mod common;

use serde_json::json;
use sqlx::PgPool;

use songforge_api::callbacks::{cover_stage, music_stage};
use songforge_core::stage;
use songforge_db::models::credit::CreateCreditTransaction;
use songforge_db::models::generation_job::CreateGenerationJob;
use songforge_db::repositories::{
    CoverImageRepo, CoverJobRepo, CreditRepo, GenerationErrorRepo, GenerationJobRepo, LyricsRepo,
    TrackRepo,
};
use songforge_provider::{CoverCallback, MusicCallback};

fn music(value: serde_json::Value) -> MusicCallback {
    serde_json::from_value(value).expect("invalid music callback fixture")
}

fn cover(value: serde_json::Value) -> CoverCallback {
    serde_json::from_value(value).expect("invalid cover callback fixture")
}

async fn seed_job(pool: &PgPool, task_id: &str, user_id: i64) {
    GenerationJobRepo::create(
        pool,
        &CreateGenerationJob {
            task_id: task_id.to_string(),
            user_id: Some(user_id),
            prompt: Some("a song about rain".to_string()),
        },
    )
    .await
    .unwrap();
}

fn text_callback(task_id: &str) -> MusicCallback {
    music(json!({
        "code": 200,
        "msg": "All generated successfully.",
        "data": {
            "taskId": task_id,
            "callbackType": "text",
            "data": [
                {
                    "id": "v-1",
                    "title": "Midnight",
                    "tags": "pop, dreamy",
                    "prompt": "[Verse]\nRain on the window",
                    "stream_audio_url": "https://stream/v1",
                    "duration": 184.2
                },
                {
                    "id": "v-2",
                    "title": "Midnight",
                    "tags": "pop, dreamy",
                    "prompt": "[Verse]\nRain on the window",
                    "stream_audio_url": "https://stream/v2",
                    "duration": 190.7
                }
            ]
        }
    }))
}

// ---------------------------------------------------------------------------
// Text stage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn text_stage_persists_job_tracks_and_lyrics(pool: PgPool) {
    let (ctx, cover_service) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;

    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_TEXT);
    assert_eq!(job.title.as_deref(), Some("Midnight"));
    assert_eq!(job.tags.as_deref(), Some("pop, dreamy"));

    let tracks = TrackRepo::list_for_job(&pool, "T1").await.unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].side, "A");
    assert_eq!(tracks[0].stream_audio_url.as_deref(), Some("https://stream/v1"));
    assert!(tracks[0].audio_url.is_none());
    assert_eq!(tracks[1].side, "B");

    let lyrics = LyricsRepo::find_by_job(&pool, "T1").await.unwrap().unwrap();
    assert!(lyrics.content.contains("Rain on the window"));

    // Cover generation kicked off once, with the job's user.
    assert_eq!(cover_service.call_count(), 1);
    let cover_job = CoverJobRepo::find_by_music_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(cover_job.task_id, "COVER-1");
    assert_eq!(cover_job.status, stage::COVER_GENERATING);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reprocessed_text_stage_triggers_cover_once(pool: PgPool) {
    let (ctx, cover_service) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;

    music_stage::process(&ctx, text_callback("T1")).await.unwrap();
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    assert_eq!(cover_service.call_count(), 1);
    assert_eq!(TrackRepo::count_for_job(&pool, "T1").await.unwrap(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn text_stage_derives_title_from_lyrics_tag(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;

    let callback = music(json!({
        "code": 200,
        "msg": "ok",
        "data": {
            "taskId": "T1",
            "callbackType": "text",
            "data": [{
                "id": "v-1",
                "prompt": "[Title: Paper Moon]\n[Verse]\nHello",
                "stream_audio_url": "https://stream/v1"
            }]
        }
    }));
    music_stage::process(&ctx, callback).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.title.as_deref(), Some("Paper Moon"));
}

// ---------------------------------------------------------------------------
// First stage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn first_stage_relocates_only_ready_variants(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    let callback = music(json!({
        "code": 200,
        "msg": "ok",
        "data": {
            "taskId": "T1",
            "callbackType": "first",
            "data": [
                { "id": "v-1", "audio_url": "https://ephemeral/v1.mp3", "duration": 184.2 },
                { "id": "v-2", "stream_audio_url": "https://stream/v2" }
            ]
        }
    }));
    music_stage::process(&ctx, callback).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_FIRST);

    let tracks = TrackRepo::list_for_job(&pool, "T1").await.unwrap();
    assert_eq!(
        tracks[0].audio_url.as_deref(),
        Some("https://cdn.test/audio/T1/midnight_0.mp3")
    );
    assert!(tracks[1].audio_url.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_relocation_skips_that_variant_and_keeps_siblings(pool: PgPool) {
    use std::sync::Arc;

    // Side B's object key ends in _1; only its relocation fails.
    let (ctx, _) = common::test_context_with_relocator(
        pool.clone(),
        Arc::new(common::SelectiveFailRelocator::failing_on("_1.mp3")),
    );
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    let callback = music(json!({
        "code": 200,
        "msg": "ok",
        "data": {
            "taskId": "T1",
            "callbackType": "first",
            "data": [
                { "id": "v-1", "audio_url": "https://ephemeral/v1.mp3" },
                { "id": "v-2", "audio_url": "https://ephemeral/v2.mp3" }
            ]
        }
    }));
    music_stage::process(&ctx, callback).await.unwrap();

    let tracks = TrackRepo::list_for_job(&pool, "T1").await.unwrap();
    assert_eq!(
        tracks[0].audio_url.as_deref(),
        Some("https://cdn.test/audio/T1/midnight_0.mp3")
    );
    // The failed variant keeps its streaming URL as the only playable copy.
    assert!(tracks[1].audio_url.is_none());
    assert_eq!(tracks[1].stream_audio_url.as_deref(), Some("https://stream/v2"));

    // One successful relocation is enough to advance the stage.
    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_FIRST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn first_stage_without_ready_audio_changes_nothing(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    let callback = music(json!({
        "code": 200,
        "msg": "ok",
        "data": {
            "taskId": "T1",
            "callbackType": "first",
            "data": [{ "id": "v-1", "stream_audio_url": "https://stream/v1" }]
        }
    }));
    music_stage::process(&ctx, callback).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_TEXT);
}

// ---------------------------------------------------------------------------
// Complete stage
// ---------------------------------------------------------------------------

fn complete_callback(task_id: &str) -> MusicCallback {
    music(json!({
        "code": 200,
        "msg": "All generated successfully.",
        "data": {
            "taskId": task_id,
            "callbackType": "complete",
            "data": [
                {
                    "id": "v-1",
                    "source_audio_url": "https://ephemeral/final-v1.mp3",
                    "audio_url": "https://ephemeral/v1.mp3",
                    "duration": 184.2
                },
                {
                    "id": "v-2",
                    "source_audio_url": "https://ephemeral/final-v2.mp3",
                    "audio_url": "https://ephemeral/v2.mp3",
                    "duration": 190.7
                }
            ]
        }
    }))
}

#[sqlx::test(migrations = "../db/migrations")]
async fn complete_stage_relocates_everything_and_finishes(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();
    music_stage::process(&ctx, complete_callback("T1")).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_COMPLETE);

    let tracks = TrackRepo::list_for_job(&pool, "T1").await.unwrap();
    assert_eq!(
        tracks[0].audio_url.as_deref(),
        Some("https://cdn.test/audio/T1/midnight_0.mp3")
    );
    assert_eq!(
        tracks[1].audio_url.as_deref(),
        Some("https://cdn.test/audio/T1/midnight_1.mp3")
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn complete_stage_waits_when_audio_is_missing(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    let callback = music(json!({
        "code": 200,
        "msg": "ok",
        "data": {
            "taskId": "T1",
            "callbackType": "complete",
            "data": [
                { "id": "v-1", "source_audio_url": "https://ephemeral/final-v1.mp3" },
                { "id": "v-2" }
            ]
        }
    }));
    music_stage::process(&ctx, callback).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_TEXT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn complete_before_text_does_not_transition(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;

    // No tracks persisted yet: the completeness gate must refuse to finish.
    music_stage::process(&ctx, complete_callback("T1")).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_CREATED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn late_text_redelivery_does_not_regress_a_finished_job(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();
    music_stage::process(&ctx, complete_callback("T1")).await.unwrap();

    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_COMPLETE);
}

// ---------------------------------------------------------------------------
// Failure family
// ---------------------------------------------------------------------------

async fn seed_spend(pool: &PgPool, user_id: i64, task_id: &str, cost: i64) {
    CreditRepo::insert(
        pool,
        &CreateCreditTransaction {
            user_id,
            amount: -cost,
            tx_type: "spend".to_string(),
            reference_id: Some(task_id.to_string()),
            reference_type: Some("generation".to_string()),
            description: None,
        },
    )
    .await
    .unwrap();
}

fn failure_callback(task_id: &str, code: i64, msg: &str) -> MusicCallback {
    music(json!({
        "code": code,
        "msg": msg,
        "data": { "taskId": task_id }
    }))
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failure_marks_error_records_and_refunds(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    seed_spend(&pool, 42, "T1", 7).await;

    music_stage::process(&ctx, failure_callback("T1", 531, "upstream unavailable"))
        .await
        .unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_ERROR);
    assert_eq!(job.title.as_deref(), Some("a song about rain"));

    let errors = GenerationErrorRepo::list_for_job(&pool, "T1").await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_code, "server_error");
    assert_eq!(errors[0].message.as_deref(), Some("upstream unavailable"));

    // The -7 spend was reversed exactly.
    assert_eq!(CreditRepo::balance_for_user(&pool, 42).await.unwrap(), 0);
    assert!(CreditRepo::has_refund_for_reference(&pool, "T1", "generation").await.unwrap());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn redelivered_failure_refunds_once(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    seed_spend(&pool, 42, "T1", 7).await;

    music_stage::process(&ctx, failure_callback("T1", 501, "generation failed")).await.unwrap();
    // Same delivery again, as after a process restart (no in-memory state).
    music_stage::process(&ctx, failure_callback("T1", 501, "generation failed")).await.unwrap();

    assert_eq!(CreditRepo::balance_for_user(&pool, 42).await.unwrap(), 0);

    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM credit_transactions WHERE tx_type = 'refund' AND reference_id = $1",
    )
    .bind("T1")
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count.0, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failure_without_spend_refunds_default_cost(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;

    music_stage::process(&ctx, failure_callback("T1", 400, "duplicate prompt")).await.unwrap();

    let errors = GenerationErrorRepo::list_for_job(&pool, "T1").await.unwrap();
    assert_eq!(errors[0].error_code, "duplicate");

    let refund = CreditRepo::latest_spend_for_reference(&pool, "T1", "generation").await.unwrap();
    assert!(refund.is_none());
    assert_eq!(CreditRepo::balance_for_user(&pool, 42).await.unwrap(), 5);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failure_after_text_still_terminates_the_job(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    music_stage::process(&ctx, failure_callback("T1", 531, "render crashed")).await.unwrap();

    let job = GenerationJobRepo::find_by_task_id(&pool, "T1").await.unwrap().unwrap();
    assert_eq!(job.status, stage::STATUS_ERROR);
    // The real title from the text stage is kept over the prompt fallback.
    assert_eq!(job.title.as_deref(), Some("Midnight"));
}

// ---------------------------------------------------------------------------
// Cover stage
// ---------------------------------------------------------------------------

fn cover_callback(task_id: &str, code: i64, msg: &str, images: Vec<&str>) -> CoverCallback {
    cover(json!({
        "code": code,
        "msg": msg,
        "data": { "taskId": task_id, "images": images }
    }))
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cover_success_pairs_images_with_track_sides(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    cover_stage::process(
        &ctx,
        cover_callback("COVER-1", 200, "ok", vec!["https://img/0.png", "https://img/1.png"]),
    )
    .await
    .unwrap();

    let images = CoverImageRepo::list_for_cover(&pool, "COVER-1").await.unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].track_side.as_deref(), Some("A"));
    assert_eq!(images[1].track_side.as_deref(), Some("B"));
    assert_eq!(images[0].file_name, "COVER-1_cover_0.png");

    let cover_job = CoverJobRepo::find_by_task_id(&pool, "COVER-1").await.unwrap().unwrap();
    assert_eq!(cover_job.status, stage::COVER_COMPLETE);

    let outcome = ctx.cover_results.get("COVER-1").await.unwrap();
    assert_eq!(outcome.status, "complete");
    assert_eq!(outcome.music_task_id.as_deref(), Some("T1"));
    assert_eq!(outcome.images.len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cover_conflict_leaves_state_untouched(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    cover_stage::process(&ctx, cover_callback("COVER-1", 400, "cover already exists", vec![]))
        .await
        .unwrap();

    let cover_job = CoverJobRepo::find_by_task_id(&pool, "COVER-1").await.unwrap().unwrap();
    assert_eq!(cover_job.status, stage::COVER_GENERATING);

    let outcome = ctx.cover_results.get("COVER-1").await.unwrap();
    assert_eq!(outcome.status, "conflict");
    assert_eq!(outcome.message.as_deref(), Some("cover already exists"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cover_failure_marks_job_and_caches_outcome(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());
    seed_job(&pool, "T1", 42).await;
    music_stage::process(&ctx, text_callback("T1")).await.unwrap();

    cover_stage::process(&ctx, cover_callback("COVER-1", 531, "upstream unavailable", vec![]))
        .await
        .unwrap();

    let cover_job = CoverJobRepo::find_by_task_id(&pool, "COVER-1").await.unwrap().unwrap();
    assert_eq!(cover_job.status, stage::COVER_ERROR);

    let outcome = ctx.cover_results.get("COVER-1").await.unwrap();
    assert_eq!(outcome.status, "error");
    assert!(CoverImageRepo::list_for_cover(&pool, "COVER-1").await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cover_result_for_unknown_job_is_cached_only(pool: PgPool) {
    let (ctx, _) = common::test_context(pool.clone());

    cover_stage::process(&ctx, cover_callback("C-ORPHAN", 200, "ok", vec!["https://img/0.png"]))
        .await
        .unwrap();

    assert!(CoverJobRepo::find_by_task_id(&pool, "C-ORPHAN").await.unwrap().is_none());
    let outcome = ctx.cover_results.get("C-ORPHAN").await.unwrap();
    assert_eq!(outcome.status, "complete");
}
