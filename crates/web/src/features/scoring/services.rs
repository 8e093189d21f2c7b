use analysis::{ScoreBreakdown, ScoringEngine, scoring::engine::join_paragraphs, scoring::service};
use sqlx::PgPool;
use storage::{
    dto::scoring::{RecomputeScoresResponse, ScoreBreakdownResponse, TopicRelevanceResponse},
    error::StorageError,
    repository::{
        competition::CompetitionRepository, essay::EssayRepository,
        paragraph::ParagraphRepository,
    },
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};

pub fn breakdown_to_response(essay_id: Uuid, breakdown: &ScoreBreakdown) -> ScoreBreakdownResponse {
    ScoreBreakdownResponse {
        essay_id,
        speed_score: breakdown.speed_score,
        word_score: breakdown.word_score,
        grammar_score: breakdown.grammar_score,
        spelling_score: breakdown.spelling_score,
        final_score: breakdown.final_score,
    }
}

/// Compute and persist the final score of one completed essay
pub async fn score_essay(pool: &PgPool, essay_id: Uuid) -> WebResult<ScoreBreakdownResponse> {
    match service::score_essay(pool, essay_id).await? {
        Some(breakdown) => Ok(breakdown_to_response(essay_id, &breakdown)),
        None => Err(StorageError::InvalidState(
            "essay is not completed yet, it has no final score".to_string(),
        )
        .into()),
    }
}

/// Recompute every final score of a competition
pub async fn recompute_competition_scores(
    pool: &PgPool,
    competition_id: Uuid,
) -> WebResult<RecomputeScoresResponse> {
    // 404 for unknown competitions rather than an empty recompute
    CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    let summary = service::recompute_competition_scores(pool, competition_id).await?;

    Ok(RecomputeScoresResponse {
        competition_id,
        recomputed_count: summary.recomputed_count,
        fastest_time_seconds: summary.extremes.map(|e| e.fastest_time_seconds()),
        max_words: summary.extremes.map(|e| e.max_words).unwrap_or(0),
    })
}

/// Similarity between the competition prompt and the essay text
pub async fn topic_relevance(
    pool: &PgPool,
    engine: &ScoringEngine,
    essay_id: Uuid,
) -> WebResult<TopicRelevanceResponse> {
    let essay = EssayRepository::new(pool).find_by_id(essay_id).await?;
    let competition = CompetitionRepository::new(pool)
        .find_by_id(essay.competition_id)
        .await?;
    let texts: Vec<String> = ParagraphRepository::new(pool)
        .list_by_essay(essay_id)
        .await?
        .into_iter()
        .map(|p| p.content)
        .collect();

    let topic = competition.topic();
    let similarity = engine
        .topic_relevance(&topic, &join_paragraphs(&texts))
        .await?
        .ok_or_else(|| {
            WebError::ServiceUnavailable("topic relevance scoring is not configured".to_string())
        })?;

    Ok(TopicRelevanceResponse {
        essay_id,
        topic,
        similarity,
    })
}
