use std::sync::Arc;

use crate::callbacks::dispatch::CallbackSender;
use crate::callbacks::idempotency::IdempotencyGuard;
use crate::callbacks::result_cache::CoverResultCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: songforge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Webhook delivery dedup guard, shared with the stage processors.
    pub guard: Arc<IdempotencyGuard>,
    /// Cached cover outcomes for the polling read endpoint.
    pub cover_results: Arc<CoverResultCache>,
    /// Submission side of the callback dispatch queue.
    pub dispatcher: CallbackSender,
}
