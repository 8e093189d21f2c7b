use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::scoring::{
    RecomputeScoresResponse, ScoreBreakdownResponse, TopicRelevanceResponse,
};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    post,
    path = "/api/essays/{essay_id}/score",
    params(
        ("essay_id" = Uuid, Path, description = "Essay ID")
    ),
    responses(
        (status = 200, description = "Final score computed", body = ScoreBreakdownResponse),
        (status = 409, description = "Essay is not completed")
    ),
    tag = "scoring"
)]
pub async fn score_essay(
    State(state): State<AppState>,
    Path(essay_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::score_essay(state.db.pool(), essay_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/essays/{essay_id}/topic-relevance",
    params(
        ("essay_id" = Uuid, Path, description = "Essay ID")
    ),
    responses(
        (status = 200, description = "Topic similarity of the essay", body = TopicRelevanceResponse),
        (status = 502, description = "Embedding service failed"),
        (status = 503, description = "Topic scoring not configured")
    ),
    tag = "scoring"
)]
pub async fn get_topic_relevance(
    State(state): State<AppState>,
    Path(essay_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::topic_relevance(state.db.pool(), &state.engine, essay_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/competitions/{competition_id}/recompute-scores",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    responses(
        (status = 200, description = "Final scores recomputed", body = RecomputeScoresResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "admin"
)]
pub async fn recompute_competition_scores(
    State(state): State<AppState>,
    Path(competition_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::recompute_competition_scores(state.db.pool(), competition_id).await?;

    Ok(Json(response).into_response())
}
