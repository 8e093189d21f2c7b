use analysis::scoring::service::{self, EssayStarted};
use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::{
        competition::{CompetitionListResponse, CompetitionSummary, CreateCompetitionRequest},
        essay::EssayStateResponse,
    },
    repository::competition::CompetitionRepository,
};
use uuid::Uuid;

use crate::error::WebResult;

pub async fn list_competitions(pool: &PgPool) -> WebResult<CompetitionListResponse> {
    let now = Utc::now();
    let competitions = CompetitionRepository::new(pool)
        .list_all()
        .await?
        .into_iter()
        .map(|c| CompetitionSummary::from_competition(c, now))
        .collect();

    Ok(CompetitionListResponse { competitions })
}

pub async fn create_competition(
    pool: &PgPool,
    request: &CreateCompetitionRequest,
) -> WebResult<CompetitionSummary> {
    let competition = CompetitionRepository::new(pool).create(request).await?;
    tracing::info!(
        "Created competition {} ({})",
        competition.competition_id,
        competition.title
    );

    Ok(CompetitionSummary::from_competition(competition, Utc::now()))
}

/// Start or resume a participant's essay; the flag tells whether it is new
pub async fn start_essay(
    pool: &PgPool,
    user_id: Uuid,
    competition_id: Uuid,
) -> WebResult<(EssayStateResponse, bool)> {
    let EssayStarted {
        essay,
        paragraph_count,
        created,
    } = service::start_essay(pool, user_id, competition_id, Utc::now()).await?;

    Ok((
        EssayStateResponse::from_essay(&essay, paragraph_count),
        created,
    ))
}
