//! Track entity model and DTOs.
//!
//! One track per provider variant, at most one row per (job, side letter).
//! `stream_audio_url` is the ephemeral preview set at the text stage;
//! `audio_url` is only ever written after a successful relocation to durable
//! storage. Until then readers fall back to the streaming URL.

use serde::{Deserialize, Serialize};
use songforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `tracks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Track {
    pub id: DbId,
    pub job_task_id: String,
    pub provider_track_id: Option<String>,
    pub side: String,
    pub stream_audio_url: Option<String>,
    pub audio_url: Option<String>,
    pub duration_secs: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for upserting a track at the text stage (streaming URL only).
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertStreamTrack {
    pub job_task_id: String,
    pub provider_track_id: Option<String>,
    pub side: String,
    pub stream_audio_url: Option<String>,
    pub duration_secs: Option<f64>,
}
