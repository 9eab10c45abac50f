//! Typed webhook bodies received from the generation provider.
//!
//! The provider mixes camelCase envelope keys (`taskId`, `callbackType`)
//! with snake_case variant fields (`audio_url`), so renames are explicit
//! per field rather than blanket `rename_all`. `taskId` is optional at the
//! wire level; handlers reject bodies without one before any processing.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Music callbacks
// ---------------------------------------------------------------------------

/// Envelope of a music generation webhook.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MusicCallback {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: MusicCallbackData,
}

/// Payload of a music generation webhook.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MusicCallbackData {
    #[serde(rename = "taskId", default)]
    pub task_id: Option<String>,
    /// Webhook stage: `text`, `first`, or `complete`.
    #[serde(rename = "callbackType", default)]
    pub callback_type: Option<String>,
    /// Track variants, present on success deliveries.
    #[serde(default)]
    pub data: Option<Vec<TrackVariant>>,
}

/// One generated track variant inside a music callback.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrackVariant {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub source_audio_url: Option<String>,
    #[serde(default)]
    pub stream_audio_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl TrackVariant {
    /// Best available final-audio URL: `source_audio_url` wins over
    /// `audio_url` when both are present. Empty strings count as absent.
    pub fn final_audio_url(&self) -> Option<&str> {
        non_empty(self.source_audio_url.as_deref()).or_else(|| non_empty(self.audio_url.as_deref()))
    }

    /// Whether this variant carries any final audio yet.
    pub fn has_final_audio(&self) -> bool {
        self.final_audio_url().is_some()
    }

    /// Streaming preview URL, treating empty strings as absent.
    pub fn stream_url(&self) -> Option<&str> {
        non_empty(self.stream_audio_url.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Cover callbacks
// ---------------------------------------------------------------------------

/// Envelope of a cover generation webhook.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverCallback {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: CoverCallbackData,
}

/// Payload of a cover generation webhook.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverCallbackData {
    #[serde(rename = "taskId", default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
