//! Shared helpers for integration tests.
//!
//! Provides a test router wired exactly like production (same middleware
//! stack via `build_app_router`) but with the provider and media seams
//! replaced by in-process stubs, plus a bare `CallbackContext` so stage
//! processors can be driven directly and deterministically.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use songforge_api::callbacks::dispatch::CallbackDispatcher;
use songforge_api::callbacks::idempotency::IdempotencyGuard;
use songforge_api::callbacks::result_cache::CoverResultCache;
use songforge_api::callbacks::CallbackContext;
use songforge_api::config::ServerConfig;
use songforge_api::router::build_app_router;
use songforge_api::state::AppState;
use songforge_media::{RelocateError, Relocator};
use songforge_provider::{CoverService, ProviderError};

/// Relocator stub: no network, returns a deterministic durable URL.
pub struct StubRelocator;

#[async_trait]
impl Relocator for StubRelocator {
    async fn relocate(&self, _source_url: &str, key: &str) -> Result<String, RelocateError> {
        Ok(format!("https://cdn.test/{key}"))
    }
}

/// Relocator stub failing only for keys containing a marker, so one
/// variant's relocation can fail while its siblings succeed.
pub struct SelectiveFailRelocator {
    pub fail_marker: String,
}

impl SelectiveFailRelocator {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: marker.to_string(),
        }
    }
}

#[async_trait]
impl Relocator for SelectiveFailRelocator {
    async fn relocate(&self, _source_url: &str, key: &str) -> Result<String, RelocateError> {
        if key.contains(&self.fail_marker) {
            Err(RelocateError::HttpStatus(503))
        } else {
            Ok(format!("https://cdn.test/{key}"))
        }
    }
}

/// Cover service stub recording every trigger it receives.
pub struct RecordingCoverService {
    pub next_task_id: String,
    pub calls: Mutex<Vec<(String, i64)>>,
}

impl RecordingCoverService {
    pub fn new(next_task_id: &str) -> Arc<Self> {
        Arc::new(Self {
            next_task_id: next_task_id.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CoverService for RecordingCoverService {
    async fn create_cover_job(
        &self,
        music_task_id: &str,
        user_id: i64,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((music_task_id.to_string(), user_id));
        Ok(self.next_task_id.clone())
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        callback_queue_capacity: 64,
        provider_base_url: "https://provider.test".to_string(),
        provider_api_key: "test-key".to_string(),
        media_bucket: "test-bucket".to_string(),
        media_public_base_url: "https://cdn.test".to_string(),
    }
}

/// Build a `CallbackContext` over the given pool with stubbed seams.
///
/// Returns the context and the recording cover service so tests can assert
/// on trigger counts.
pub fn test_context(pool: PgPool) -> (CallbackContext, Arc<RecordingCoverService>) {
    test_context_with_relocator(pool, Arc::new(StubRelocator))
}

/// Like [`test_context`] with a caller-chosen relocator, for tests that
/// exercise relocation-failure behavior.
pub fn test_context_with_relocator(
    pool: PgPool,
    relocator: Arc<dyn Relocator>,
) -> (CallbackContext, Arc<RecordingCoverService>) {
    let cover_service = RecordingCoverService::new("COVER-1");
    let ctx = CallbackContext {
        pool,
        relocator,
        cover_service: Arc::clone(&cover_service) as Arc<dyn CoverService>,
        guard: Arc::new(IdempotencyGuard::with_default_ttl()),
        cover_results: Arc::new(CoverResultCache::with_default_retention()),
    };
    (ctx, cover_service)
}

/// Build the full application router over the given pool.
///
/// The dispatcher runs for real (bounded queue, background task) so the
/// fast path behaves exactly as in production; processing itself is not
/// awaited here, which is why stage-level tests use [`test_context`] and
/// call the processors directly instead.
pub fn build_test_app(pool: PgPool) -> Router {
    let (app, _) = build_test_app_with_context(pool);
    app
}

/// Like [`build_test_app`], also returning the underlying context so a
/// test can reach the cover result cache or the dedup guard.
pub fn build_test_app_with_context(pool: PgPool) -> (Router, CallbackContext) {
    let config = test_config();
    let (ctx, _) = test_context(pool.clone());

    let (sender, _handle) = CallbackDispatcher::start(
        ctx.clone(),
        config.callback_queue_capacity,
        CancellationToken::new(),
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        guard: Arc::clone(&ctx.guard),
        cover_results: Arc::clone(&ctx.cover_results),
        dispatcher: sender,
    };

    (build_app_router(state, &config), ctx)
}

/// Build the router over a dispatcher that has already shut down, so every
/// enqueue fails. Exercises the fast path's behavior when processing
/// capacity is gone.
pub async fn build_test_app_with_stopped_dispatcher(pool: PgPool) -> Router {
    let config = test_config();
    let (ctx, _) = test_context(pool.clone());

    let cancel = CancellationToken::new();
    let (sender, handle) = CallbackDispatcher::start(
        ctx.clone(),
        config.callback_queue_capacity,
        cancel.clone(),
    );
    cancel.cancel();
    handle.await.expect("dispatcher task panicked");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        guard: Arc::clone(&ctx.guard),
        cover_results: Arc::clone(&ctx.cover_results),
        dispatcher: sender,
    };

    build_app_router(state, &config)
}

/// Send a GET request to the app and return the response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await
    .expect("request failed")
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
    )
    .await
    .expect("request failed")
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body was not valid JSON")
}

/// Assert a response status, consuming the response.
pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
