use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use shared::api::{is_phantom_id, AckResponse, CreateResponse, SaveItemRequest};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::mapping::{ItemDraft, SaveTarget};
use crate::state::AppState;

/// `POST /api/create`
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<SaveItemRequest>, JsonRejection>,
) -> ApiResult<Json<CreateResponse>> {
    let Json(payload) = payload?;
    let draft = ItemDraft::from_request(payload, &state.layout, SaveTarget::Create);
    draft.validate()?;

    let board_id = state.monday.resolve_board_id(&state.board).await?;
    let id = state
        .monday
        .create_item(&board_id, &draft.item_name, &draft.column_values)
        .await?;

    if draft.replaces_phantom() {
        tracing::info!(
            item_id = %id,
            phantom_id = ?draft.phantom_id,
            "Created item for placeholder"
        );
    } else {
        tracing::info!(item_id = %id, "Created item");
    }

    Ok(Json(CreateResponse::new(id, draft.phantom_id)))
}

/// `PATCH /api/update/:id`
pub async fn update_item(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<SaveItemRequest>, JsonRejection>,
) -> ApiResult<Json<AckResponse>> {
    let Path(id) = id?;
    let item_id = board_item_id(&id)?;
    let Json(payload) = payload?;
    let draft = ItemDraft::from_request(payload, &state.layout, SaveTarget::Update);
    draft.validate()?;

    let board_id = state.monday.resolve_board_id(&state.board).await?;
    state
        .monday
        .change_column_values(&board_id, item_id, &draft.column_values)
        .await?;

    tracing::info!(item_id, columns = draft.column_values.len(), "Updated item");
    Ok(Json(AckResponse::ok()))
}

/// `DELETE /api/delete/:id`
pub async fn delete_item(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<AckResponse>> {
    let Path(id) = id?;
    let item_id = board_item_id(&id)?;
    state.monday.delete_item(item_id).await?;

    tracing::info!(item_id, "Deleted item");
    Ok(Json(AckResponse::ok()))
}

/// Rejects ids that cannot name a persisted monday.com item, before any
/// upstream call is made.
fn board_item_id(raw: &str) -> ApiResult<&str> {
    let id = raw.trim();
    if is_phantom_id(id) {
        return Err(ApiError::bad_request(format!(
            "item {id} has not been saved to the board yet"
        )));
    }
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request(format!(
            "item id must be numeric, got {raw:?}"
        )));
    }
    Ok(id)
}
