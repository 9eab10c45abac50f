//! GET /callbacks/cover/result — poll for a cover job's outcome.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::callbacks::result_cache::CoverOutcome;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CoverResultQuery {
    #[serde(rename = "taskId")]
    pub task_id: String,
}

/// Return the cached outcome for a cover task: 200 with the outcome when
/// one is retained, 202 with a pending placeholder otherwise. The cache is
/// in-memory with a 24h retention, so "pending" also covers outcomes that
/// aged out or predate the current process.
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<CoverResultQuery>,
) -> AppResult<Response> {
    let task_id = query.task_id.trim();
    if task_id.is_empty() {
        return Err(AppError::BadRequest("Missing taskId".to_string()));
    }

    match state.cover_results.get(task_id).await {
        Some(outcome) => Ok(Json(DataResponse { data: outcome }).into_response()),
        None => {
            let pending = CoverOutcome {
                task_id: task_id.to_string(),
                status: "pending".to_string(),
                music_task_id: None,
                images: Vec::new(),
                message: None,
            };
            Ok((StatusCode::ACCEPTED, Json(DataResponse { data: pending })).into_response())
        }
    }
}
