use analysis::ScoringEngine;
use analysis::scoring::service::{self, ParagraphAdded};
use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::essay::{EssayDetailResponse, EssayStateResponse},
    models::Essay,
    repository::{essay::EssayRepository, paragraph::ParagraphRepository},
};
use uuid::Uuid;

use crate::error::WebResult;

async fn state_response(pool: &PgPool, essay: &Essay) -> WebResult<EssayStateResponse> {
    let count = ParagraphRepository::new(pool)
        .count_by_essay(essay.essay_id)
        .await?;
    Ok(EssayStateResponse::from_essay(essay, count))
}

/// Get an essay with its paragraphs
pub async fn get_essay_detail(pool: &PgPool, essay_id: Uuid) -> WebResult<EssayDetailResponse> {
    let repo = EssayRepository::new(pool);
    Ok(repo.find_detail(essay_id).await?)
}

/// Add a paragraph, completing the essay when the limit is reached
pub async fn add_paragraph(
    pool: &PgPool,
    engine: &ScoringEngine,
    essay_id: Uuid,
    content: &str,
) -> WebResult<EssayStateResponse> {
    let ParagraphAdded {
        essay,
        paragraph_count,
        ..
    } = service::add_paragraph(pool, engine, essay_id, content, Utc::now()).await?;

    Ok(EssayStateResponse::from_essay(&essay, paragraph_count))
}

/// Complete an essay and run grammar analysis
pub async fn complete_essay(
    pool: &PgPool,
    engine: &ScoringEngine,
    essay_id: Uuid,
) -> WebResult<EssayStateResponse> {
    let essay = service::complete_essay(pool, engine, essay_id).await?;
    state_response(pool, &essay).await
}

pub async fn lock_essay(pool: &PgPool, essay_id: Uuid) -> WebResult<EssayStateResponse> {
    let locked = service::lock_essay(pool, essay_id).await?;
    state_response(pool, &locked).await
}

pub async fn unlock_essay(pool: &PgPool, essay_id: Uuid) -> WebResult<EssayStateResponse> {
    let unlocked = service::unlock_essay(pool, essay_id).await?;
    state_response(pool, &unlocked).await
}
