use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{create_competition, list_competitions, start_essay};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_competitions))
        .route("/:competition_id/essays", post(start_essay))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/", post(create_competition))
}
