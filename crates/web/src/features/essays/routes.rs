use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{add_paragraph, complete_essay, get_essay, lock_essay, unlock_essay};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:essay_id", get(get_essay))
        .route("/:essay_id/paragraphs", post(add_paragraph))
        .route("/:essay_id/complete", post(complete_essay))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/:essay_id/lock", post(lock_essay))
        .route("/:essay_id/unlock", post(unlock_essay))
}
