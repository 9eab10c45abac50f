//! POST /callbacks/cover — the provider's cover art webhook.

use axum::extract::State;
use axum::Json;

use songforge_provider::CoverCallback;

use crate::callbacks::dispatch::{CallbackJob, DispatchError};
use crate::callbacks::idempotency::IdempotencyGuard;
use crate::error::{AppError, AppResult};
use crate::response::{CallbackAck, DataResponse};
use crate::state::AppState;

/// Acknowledge a cover delivery. Same fast-path contract as the music
/// webhook, keyed by `(taskId, code)`.
pub async fn receive(
    State(state): State<AppState>,
    Json(callback): Json<CoverCallback>,
) -> AppResult<Json<DataResponse<CallbackAck>>> {
    let task_id = callback
        .data
        .task_id
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing taskId in callback data".to_string()))?;

    let key = IdempotencyGuard::cover_key(task_id, callback.code);
    if !state.guard.try_mark(&key).await {
        tracing::debug!(task_id, key, "Duplicate cover delivery acknowledged");
        return Ok(Json(DataResponse {
            data: CallbackAck::duplicate(),
        }));
    }

    if let Err(e) = state.dispatcher.enqueue(CallbackJob::Cover(callback)) {
        state.guard.unmark(&key).await;
        return Err(match e {
            DispatchError::QueueFull => {
                AppError::InternalError("Callback queue is full".to_string())
            }
            DispatchError::Closed => {
                AppError::InternalError("Callback dispatcher is not running".to_string())
            }
        });
    }

    Ok(Json(DataResponse {
        data: CallbackAck::received(),
    }))
}
