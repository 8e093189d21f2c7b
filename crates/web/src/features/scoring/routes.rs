use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{get_topic_relevance, recompute_competition_scores, score_essay};
use crate::state::AppState;

pub fn essay_routes() -> Router<AppState> {
    Router::new()
        .route("/:essay_id/score", post(score_essay))
        .route("/:essay_id/topic-relevance", get(get_topic_relevance))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/:competition_id/recompute-scores",
        post(recompute_competition_scores),
    )
}
