use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::{
    competition::{
        CompetitionListResponse, CompetitionSummary, CreateCompetitionRequest, StartEssayRequest,
    },
    essay::EssayStateResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions",
    responses(
        (status = 200, description = "All competitions with their current phase", body = CompetitionListResponse)
    ),
    tag = "competitions"
)]
pub async fn list_competitions(State(state): State<AppState>) -> Result<Response, WebError> {
    let response = services::list_competitions(state.db.pool()).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/essays",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    request_body = StartEssayRequest,
    responses(
        (status = 201, description = "Essay started", body = EssayStateResponse),
        (status = 200, description = "Participant already has an essay", body = EssayStateResponse),
        (status = 404, description = "Competition or user not found"),
        (status = 409, description = "Competition is not active")
    ),
    tag = "competitions"
)]
pub async fn start_essay(
    State(state): State<AppState>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<StartEssayRequest>,
) -> Result<Response, WebError> {
    let (essay, created) =
        services::start_essay(state.db.pool(), req.user_id, competition_id).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(essay)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/competitions",
    request_body = CreateCompetitionRequest,
    responses(
        (status = 201, description = "Competition created successfully", body = CompetitionSummary),
        (status = 400, description = "Validation error")
    ),
    tag = "admin"
)]
pub async fn create_competition(
    State(state): State<AppState>,
    Json(req): Json<CreateCompetitionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let competition = services::create_competition(state.db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(competition)).into_response())
}
