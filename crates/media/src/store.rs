//! Blob storage behind the relocator.
//!
//! [`BlobStore`] is the narrow upload contract; [`S3BlobStore`] is the
//! production implementation, [`MemoryBlobStore`] backs tests and local
//! development without credentials.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tokio::sync::Mutex;

/// Error type for blob uploads.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage backend rejected or failed the upload.
    #[error("Upload failed: {0}")]
    Upload(String),
}

/// Durable blob storage: write bytes under a key, get back a stable URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, returning the public URL of the object.
    ///
    /// Writing the same key twice overwrites the object; relocation keys
    /// are deterministic so redeliveries converge on one copy.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, StoreError>;
}

// ---------------------------------------------------------------------------
// S3BlobStore
// ---------------------------------------------------------------------------

/// S3-backed blob store.
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    /// Build a store from ambient AWS configuration (env vars, profile).
    ///
    /// `public_base_url` is the URL prefix under which uploaded keys are
    /// readable, e.g. a CDN or bucket website endpoint.
    pub async fn from_env(bucket: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.into(),
            public_base_url: trim_trailing_slash(public_base_url.into()),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StoreError::Upload(e.to_string()))?;

        Ok(format!("{}/{key}", self.public_base_url))
    }
}

// ---------------------------------------------------------------------------
// MemoryBlobStore
// ---------------------------------------------------------------------------

/// In-memory blob store for tests and local development.
pub struct MemoryBlobStore {
    base_url: String,
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a stored object as (content_type, bytes).
    pub async fn get(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects.lock().await.get(key).cloned()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.lock().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        self.objects
            .lock()
            .await
            .insert(key.to_string(), (content_type.to_string(), bytes));
        Ok(format!("{}/{key}", self.base_url))
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryBlobStore::new("https://cdn.test/");
        let url = store
            .put("audio/T1/a_0.mp3", vec![1, 2, 3], "audio/mpeg")
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.test/audio/T1/a_0.mp3");

        let (content_type, bytes) = store.get("audio/T1/a_0.mp3").await.unwrap();
        assert_eq!(content_type, "audio/mpeg");
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn same_key_overwrites() {
        let store = MemoryBlobStore::new("https://cdn.test");
        store.put("k", vec![1], "audio/mpeg").await.unwrap();
        store.put("k", vec![2], "audio/mpeg").await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("k").await.unwrap().1, vec![2]);
    }
}
