//! Outbound HTTP client for the generation provider's cover endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use songforge_core::types::DbId;

/// HTTP request timeout for a provider call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Error type for outbound provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request failed (network, DNS, timeout).
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx HTTP status.
    #[error("Provider returned HTTP {0}")]
    HttpStatus(u16),

    /// The provider answered 2xx but the body reported a failure or was
    /// missing the new task id.
    #[error("Provider rejected the request: {0}")]
    Rejected(String),
}

/// The cover trigger's view of the provider: create a cover job for a music
/// task and get back the new cover task id.
#[async_trait]
pub trait CoverService: Send + Sync {
    async fn create_cover_job(
        &self,
        music_task_id: &str,
        user_id: DbId,
    ) -> Result<String, ProviderError>;
}

/// Production provider client with bearer authentication.
pub struct HttpProviderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CreateCoverResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<CreateCoverResponseData>,
}

#[derive(Debug, Deserialize)]
struct CreateCoverResponseData {
    #[serde(rename = "taskId", default)]
    task_id: Option<String>,
}

impl HttpProviderClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl CoverService for HttpProviderClient {
    async fn create_cover_job(
        &self,
        music_task_id: &str,
        user_id: DbId,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/api/v1/cover/create", self.base_url);
        let payload = serde_json::json!({
            "musicTaskId": music_task_id,
            "userId": user_id,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        let body: CreateCoverResponse = response.json().await?;
        if body.code != 200 {
            return Err(ProviderError::Rejected(format!(
                "code {}: {}",
                body.code, body.msg
            )));
        }

        let task_id = body
            .data
            .and_then(|d| d.task_id)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Rejected("response missing taskId".to_string()))?;

        tracing::info!(music_task_id, cover_task_id = %task_id, "Cover job created at provider");
        Ok(task_id)
    }
}
