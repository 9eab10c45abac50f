pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /callbacks/music          music webhook (POST)
/// /callbacks/cover          cover webhook (POST)
/// /callbacks/cover/result   cover outcome poll (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/callbacks/music", post(handlers::music_callback::receive))
        .route("/callbacks/cover", post(handlers::cover_callback::receive))
        .route("/callbacks/cover/result", get(handlers::cover_result::get))
}
