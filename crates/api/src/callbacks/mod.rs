//! Callback orchestration: dedup, dispatch, and the stage processors.
//!
//! Handlers acknowledge webhooks fast and push the parsed body onto the
//! dispatch queue; everything in this module runs after the HTTP response
//! was sent and therefore reports failures through logs and ledger state,
//! never back to the provider.

use std::sync::Arc;

use songforge_media::Relocator;
use songforge_provider::CoverService;

pub mod cover_stage;
pub mod cover_trigger;
pub mod dispatch;
pub mod idempotency;
pub mod music_stage;
pub mod refund;
pub mod result_cache;

/// Everything a stage processor needs, bundled so the dispatcher task and
/// tests can run processors without the HTTP layer.
#[derive(Clone)]
pub struct CallbackContext {
    pub pool: songforge_db::DbPool,
    pub relocator: Arc<dyn Relocator>,
    pub cover_service: Arc<dyn CoverService>,
    pub guard: Arc<idempotency::IdempotencyGuard>,
    pub cover_results: Arc<result_cache::CoverResultCache>,
}

/// Error type for stage processing.
///
/// Stage processors swallow and log most sub-step failures; what escapes
/// through this type is only what must abort the remaining steps (see the
/// completeness handling in [`music_stage`]).
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
