use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use storage::error::StorageError;
use storage::models::{Essay, EssayStatus, Paragraph};
use storage::repository::competition::CompetitionRepository;
use storage::repository::essay::EssayRepository;
use storage::repository::paragraph::ParagraphRepository;
use uuid::Uuid;

use super::engine::{self, ScoreBreakdown, ScoringEngine};
use super::extremes::CompetitionExtremes;
use crate::error::Result;

pub struct EssayStarted {
    pub essay: Essay,
    pub paragraph_count: i64,
    pub created: bool,
}

pub struct ParagraphAdded {
    pub essay: Essay,
    pub paragraph: Paragraph,
    pub paragraph_count: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct RecomputeSummary {
    pub recomputed_count: u64,
    pub extremes: Option<CompetitionExtremes>,
}

fn inactive_competition() -> StorageError {
    StorageError::InvalidState("this competition is not currently active".to_string())
}

/// Starts the participant's essay in an active competition, or returns the
/// one they already have
pub async fn start_essay(
    pool: &PgPool,
    user_id: Uuid,
    competition_id: Uuid,
    now: DateTime<Utc>,
) -> Result<EssayStarted> {
    let competition = CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    if !competition.is_active(now) {
        return Err(inactive_competition().into());
    }

    let (essay, created) = EssayRepository::new(pool)
        .get_or_create(user_id, competition_id)
        .await?;
    if created {
        tracing::info!(
            "User {} started essay {} in competition {}",
            user_id,
            essay.essay_id,
            competition_id
        );
    }

    let paragraph_count = ParagraphRepository::new(pool)
        .count_by_essay(essay.essay_id)
        .await?;

    Ok(EssayStarted {
        essay,
        paragraph_count,
        created,
    })
}

/// Appends a paragraph to an in-progress essay of an active competition.
/// Reaching the competition's paragraph limit completes the essay.
///
/// The essay row stays locked from the limit check until the paragraph and
/// any completion are committed, so appends to one essay are serialized.
pub async fn add_paragraph(
    pool: &PgPool,
    engine: &ScoringEngine,
    essay_id: Uuid,
    content: &str,
    now: DateTime<Utc>,
) -> Result<ParagraphAdded> {
    let essays = EssayRepository::new(pool);
    let paragraphs = ParagraphRepository::new(pool);

    // No pool queries while the row lock is held.
    let competition_id = essays.find_by_id(essay_id).await?.competition_id;
    let competition = CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;

    if !competition.is_active(now) {
        return Err(inactive_competition().into());
    }

    let mut tx = pool.begin().await.map_err(StorageError::from)?;
    let essay = essays.lock_for_update(&mut tx, essay_id).await?;

    let count = paragraphs.count_by_essay_in(&mut tx, essay_id).await?;
    if !essay.can_add_paragraph(count, competition.max_paragraphs) {
        return Err(StorageError::InvalidState(
            "no more paragraphs can be added to this essay".to_string(),
        )
        .into());
    }

    let paragraph = paragraphs.append(&mut tx, essay_id, content).await?;
    let paragraph_count = count + 1;

    let essay = if paragraph_count >= i64::from(competition.max_paragraphs) {
        finish_locked(pool, &mut tx, engine, essay).await?
    } else {
        essay
    };

    tx.commit().await.map_err(StorageError::from)?;
    tracing::info!(
        "Saved paragraph {} of essay {}",
        paragraph.paragraph_order,
        essay_id
    );

    Ok(ParagraphAdded {
        essay,
        paragraph,
        paragraph_count,
    })
}

/// Transitions an in-progress essay to completed: stamps `completed_at`,
/// recomputes the word count and runs grammar analysis once.
///
/// Essays that are already completed or locked are returned unchanged.
pub async fn complete_essay(
    pool: &PgPool,
    engine: &ScoringEngine,
    essay_id: Uuid,
) -> Result<Essay> {
    let mut tx = pool.begin().await.map_err(StorageError::from)?;
    let essay = EssayRepository::new(pool)
        .lock_for_update(&mut tx, essay_id)
        .await?;

    if !essay.is_in_progress() {
        tracing::debug!(
            "Essay {} is already {}, nothing to complete",
            essay_id,
            essay.status
        );
        return Ok(essay);
    }

    let saved = finish_locked(pool, &mut tx, engine, essay).await?;
    tx.commit().await.map_err(StorageError::from)?;

    Ok(saved)
}

/// Completes an essay whose row lock is held on `conn`. Paragraphs are read
/// under that lock so `word_count` matches what is stored.
async fn finish_locked(
    pool: &PgPool,
    conn: &mut PgConnection,
    engine: &ScoringEngine,
    mut essay: Essay,
) -> Result<Essay> {
    let texts: Vec<String> = ParagraphRepository::new(pool)
        .list_by_essay_in(&mut *conn, essay.essay_id)
        .await?
        .into_iter()
        .map(|p| p.content)
        .collect();

    essay.status = EssayStatus::Completed;
    essay.completed_at = Some(Utc::now());
    essay.word_count = engine::word_count(&texts);

    let grammar = engine.analyze_grammar(&texts).await;
    ScoringEngine::apply_grammar(&mut essay, &grammar);

    let saved = EssayRepository::new(pool)
        .save_completion(&mut *conn, &essay)
        .await?;
    tracing::info!(
        "Completed essay {} ({} words, grammar score {})",
        saved.essay_id,
        saved.word_count,
        saved.grammar_score
    );

    Ok(saved)
}

pub async fn lock_essay(pool: &PgPool, essay_id: Uuid) -> Result<Essay> {
    let locked = EssayRepository::new(pool).lock(essay_id).await?;
    tracing::info!("Essay {} has been locked", essay_id);

    Ok(locked)
}

/// Unlock restores `completed` for finished essays and `in_progress` otherwise
pub async fn unlock_essay(pool: &PgPool, essay_id: Uuid) -> Result<Essay> {
    let repo = EssayRepository::new(pool);
    // 404 for unknown essays, 409 for ones that are not locked
    repo.find_by_id(essay_id).await?;

    let unlocked = repo
        .unlock(essay_id)
        .await?
        .ok_or_else(|| StorageError::InvalidState("essay is not locked".to_string()))?;
    tracing::info!(
        "Essay {} has been unlocked ({})",
        essay_id,
        unlocked.status
    );

    Ok(unlocked)
}

/// Extremes over the competition's finished essays
pub async fn competition_extremes(
    pool: &PgPool,
    competition_id: Uuid,
) -> Result<Option<CompetitionExtremes>> {
    let essays = EssayRepository::new(pool)
        .list_finished_by_competition(competition_id)
        .await?;

    Ok(CompetitionExtremes::from_essays(&essays))
}

/// Scores one essay against its competition's current extremes and persists
/// the result. `None` when the essay is not completed yet.
pub async fn score_essay(pool: &PgPool, essay_id: Uuid) -> Result<Option<ScoreBreakdown>> {
    let repo = EssayRepository::new(pool);
    let mut essay = repo.find_by_id(essay_id).await?;

    if essay.completed_at.is_none() {
        return Ok(None);
    }

    let Some(extremes) = competition_extremes(pool, essay.competition_id).await? else {
        return Ok(None);
    };

    let breakdown = ScoringEngine::calculate_final_score(&mut essay, &extremes);
    if let Some(ref b) = breakdown {
        repo.update_final_score(essay_id, b.final_score).await?;
        tracing::info!("Essay {} final score {}", essay_id, b.final_score);
    }

    Ok(breakdown)
}

/// Recomputes every finished essay of a competition from one snapshot and
/// writes all final scores in a single transaction
pub async fn recompute_competition_scores(
    pool: &PgPool,
    competition_id: Uuid,
) -> Result<RecomputeSummary> {
    let repo = EssayRepository::new(pool);
    let mut essays = repo.list_finished_by_competition(competition_id).await?;

    let Some(extremes) = CompetitionExtremes::from_essays(&essays) else {
        tracing::info!(
            "Competition {} has no completed essays to score",
            competition_id
        );
        return Ok(RecomputeSummary {
            recomputed_count: 0,
            extremes: None,
        });
    };

    let scores: Vec<(Uuid, Decimal)> = essays
        .iter_mut()
        .filter_map(|essay| {
            ScoringEngine::calculate_final_score(essay, &extremes)
                .map(|b| (essay.essay_id, b.final_score))
        })
        .collect();

    let recomputed_count = repo.update_final_scores(&scores).await?;

    tracing::info!(
        "Recomputed {} final scores for competition {} (fastest {}s, max {} words)",
        recomputed_count,
        competition_id,
        extremes.fastest_time_seconds(),
        extremes.max_words
    );

    Ok(RecomputeSummary {
        recomputed_count,
        extremes: Some(extremes),
    })
}

/// Recomputes scores for every competition that has ended by `now`
pub async fn recompute_ended_competitions(pool: &PgPool, now: DateTime<Utc>) -> Result<u64> {
    let competitions = CompetitionRepository::new(pool).list_ended(now).await?;

    let mut total = 0u64;
    for competition in competitions {
        let summary = recompute_competition_scores(pool, competition.competition_id).await?;
        total += summary.recomputed_count;
    }

    Ok(total)
}
