//! POST /callbacks/music — the provider's music webhook.

use axum::extract::State;
use axum::Json;

use songforge_provider::MusicCallback;

use crate::callbacks::dispatch::{CallbackJob, DispatchError};
use crate::callbacks::idempotency::IdempotencyGuard;
use crate::error::{AppError, AppResult};
use crate::response::{CallbackAck, DataResponse};
use crate::state::AppState;

/// Acknowledge a music delivery.
///
/// Fast path only: a missing `taskId` is the one hard rejection (400); a
/// recognized duplicate is acknowledged without enqueueing; everything else
/// goes onto the dispatch queue and returns 200 immediately.
pub async fn receive(
    State(state): State<AppState>,
    Json(callback): Json<MusicCallback>,
) -> AppResult<Json<DataResponse<CallbackAck>>> {
    let task_id = callback
        .data
        .task_id
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing taskId in callback data".to_string()))?;

    let key = IdempotencyGuard::music_key(
        task_id,
        callback.data.callback_type.as_deref(),
        callback.code,
    );
    if !state.guard.try_mark(&key).await {
        tracing::debug!(task_id, key, "Duplicate music delivery acknowledged");
        return Ok(Json(DataResponse {
            data: CallbackAck::duplicate(),
        }));
    }

    if let Err(e) = state.dispatcher.enqueue(CallbackJob::Music(callback)) {
        // The delivery was not handed off, so the key must not stay marked:
        // the provider gets a 500 and the redelivery starts from scratch.
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
