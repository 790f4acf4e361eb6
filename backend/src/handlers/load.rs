use axum::{extract::State, Json};
use shared::api::LoadResponse;

use crate::error::ApiResult;
use crate::mapping::flatten_board;
use crate::state::AppState;

/// `GET /api/load`: the whole board, flattened for the scheduler.
pub async fn load_board(State(state): State<AppState>) -> ApiResult<Json<LoadResponse>> {
    let items = state
        .monday
        .fetch_board_items(&state.board, state.page_size)
        .await?;

    let snapshot = flatten_board(&items, &state.layout);
    tracing::info!(
        events = snapshot.events.len(),
        resources = snapshot.resources.len(),
        statuses = snapshot.status_values.len(),
        "Loaded board"
    );

    Ok(Json(snapshot.into()))
}
