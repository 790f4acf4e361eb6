use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{health, items, load};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/load", get(load::load_board))
        .route("/create", post(items::create_item))
        .route("/update/:id", patch(items::update_item))
        .route("/delete/:id", delete(items::delete_item))
}

/// Router with every route and state attached, before middleware layers.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .with_state(state)
}
