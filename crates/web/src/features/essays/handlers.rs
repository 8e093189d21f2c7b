use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::essay::{AddParagraphRequest, EssayDetailResponse, EssayStateResponse};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/essays/{essay_id}",
    params(
        ("essay_id" = Uuid, Path, description = "Essay ID")
    ),
    responses(
        (status = 200, description = "Essay with its paragraphs", body = EssayDetailResponse),
        (status = 404, description = "Essay not found")
    ),
    tag = "essays"
)]
pub async fn get_essay(
    State(state): State<AppState>,
    Path(essay_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let essay = services::get_essay_detail(state.db.pool(), essay_id).await?;

    Ok(Json(essay).into_response())
}

#[utoipa::path(
    post,
    path = "/api/essays/{essay_id}/paragraphs",
    params(
        ("essay_id" = Uuid, Path, description = "Essay ID")
    ),
    request_body = AddParagraphRequest,
    responses(
        (status = 200, description = "Paragraph saved", body = EssayStateResponse),
        (status = 400, description = "Invalid paragraph"),
        (status = 409, description = "Essay or competition does not accept paragraphs")
    ),
    tag = "essays"
)]
pub async fn add_paragraph(
    State(state): State<AppState>,
    Path(essay_id): Path<Uuid>,
    Json(payload): Json<AddParagraphRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;

    let response =
        services::add_paragraph(state.db.pool(), &state.engine, essay_id, &payload.content).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/essays/{essay_id}/complete",
    params(
        ("essay_id" = Uuid, Path, description = "Essay ID")
    ),
    responses(
        (status = 200, description = "Essay completed and analyzed", body = EssayStateResponse),
        (status = 404, description = "Essay not found")
    ),
    tag = "essays"
)]
pub async fn complete_essay(
    State(state): State<AppState>,
    Path(essay_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::complete_essay(state.db.pool(), &state.engine, essay_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/essays/{essay_id}/lock",
    params(
        ("essay_id" = Uuid, Path, description = "Essay ID")
    ),
    responses(
        (status = 200, description = "Essay locked", body = EssayStateResponse),
        (status = 404, description = "Essay not found")
    ),
    tag = "admin"
)]
pub async fn lock_essay(
    State(state): State<AppState>,
    Path(essay_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::lock_essay(state.db.pool(), essay_id).await?;

    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/admin/essays/{essay_id}/unlock",
    params(
        ("essay_id" = Uuid, Path, description = "Essay ID")
    ),
    responses(
        (status = 200, description = "Essay unlocked", body = EssayStateResponse),
        (status = 409, description = "Essay is not locked")
    ),
    tag = "admin"
)]
pub async fn unlock_essay(
    State(state): State<AppState>,
    Path(essay_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let response = services::unlock_essay(state.db.pool(), essay_id).await?;

    Ok(Json(response).into_response())
}
