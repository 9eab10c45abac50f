//! Copy an ephemeral provider URL into durable storage.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::store::{BlobStore, StoreError};

/// HTTP timeout for a single media download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Hard ceiling on downloaded media size (64 MiB).
const MAX_MEDIA_BYTES: usize = 64 * 1024 * 1024;

/// Error type for relocation failures.
///
/// A relocation failure is never fatal to its stage: the caller logs it,
/// leaves the track's durable fields unset, and moves on to siblings.
#[derive(Debug, thiserror::Error)]
pub enum RelocateError {
    /// The download request failed (network, DNS, timeout).
    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    /// The source host answered with a non-2xx status.
    #[error("Source returned HTTP {0}")]
    HttpStatus(u16),

    /// The payload exceeded [`MAX_MEDIA_BYTES`].
    #[error("Media too large: {0} bytes")]
    TooLarge(usize),

    /// The upload to durable storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The relocation contract: `relocate(source_url, key) -> durable_url`.
#[async_trait]
pub trait Relocator: Send + Sync {
    async fn relocate(&self, source_url: &str, key: &str) -> Result<String, RelocateError>;
}

/// Production relocator: reqwest download, [`BlobStore`] upload.
pub struct HttpRelocator {
    http: reqwest::Client,
    store: Arc<dyn BlobStore>,
}

impl HttpRelocator {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { http, store }
    }
}

#[async_trait]
impl Relocator for HttpRelocator {
    async fn relocate(&self, source_url: &str, key: &str) -> Result<String, RelocateError> {
        let mut response = self.http.get(source_url).send().await?;
        if !response.status().is_success() {
            return Err(RelocateError::HttpStatus(response.status().as_u16()));
        }

        // Reject a declared oversize before reading any of the body.
        if let Some(declared) = response.content_length() {
            if declared as usize > MAX_MEDIA_BYTES {
                return Err(RelocateError::TooLarge(declared as usize));
            }
        }

        // Prefer the source's content type; fall back to the key extension.
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for_key(key).to_string());

        // Accumulate chunks under a running cap so a lying or chunked
        // source cannot buffer past the ceiling.
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > MAX_MEDIA_BYTES {
                return Err(RelocateError::TooLarge(bytes.len() + chunk.len()));
            }
            bytes.extend_from_slice(&chunk);
        }

        let durable_url = self.store.put(key, bytes, &content_type).await?;
        tracing::debug!(source_url, key, durable_url, "Relocated media to durable storage");
        Ok(durable_url)
    }
}

/// Infer a content type from the object key extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit('.').next() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
