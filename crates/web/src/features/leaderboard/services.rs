use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::leaderboard::LeaderboardResponse,
    repository::{competition::CompetitionRepository, leaderboard::LeaderboardRepository},
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};

/// Leaderboard of a competition, available once it has ended
pub async fn get_leaderboard(
    pool: &PgPool,
    competition_id: Uuid,
) -> WebResult<LeaderboardResponse> {
    let competition = CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    if !competition.has_ended(Utc::now()) {
        return Err(WebError::BadRequest(
            "Leaderboard will be available after the competition ends".to_string(),
        ));
    }

    let entries = LeaderboardRepository::new(pool)
        .get_competition_leaderboard(competition_id)
        .await?;

    Ok(LeaderboardResponse {
        competition_id,
        title: competition.title,
        entries,
    })
}
