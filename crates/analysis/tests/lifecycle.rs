//! Essay lifecycle and scoring against a real Postgres.
//!
//! Run with `DATABASE_URL` pointing at a server where the test user may
//! create databases, then `cargo test -p analysis -- --ignored`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use analysis::scoring::service;
use analysis::{AnalysisError, GrammarChecker, GrammarMatch, ScoringEngine};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use storage::error::StorageError;
use storage::models::{Essay, EssayStatus};
use storage::repository::essay::EssayRepository;
use storage::repository::paragraph::ParagraphRepository;
use uuid::Uuid;

/// Reports one misspelling per call and counts how often it was asked
struct CountingChecker {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl GrammarChecker for CountingChecker {
    async fn check(&self, _text: &str) -> analysis::Result<Vec<GrammarMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![GrammarMatch::spelling("MORFOLOGIK_RULE_EN_US")])
    }
}

fn engine() -> (Arc<CountingChecker>, Arc<ScoringEngine>) {
    let checker = Arc::new(CountingChecker {
        calls: AtomicUsize::new(0),
    });
    let engine = ScoringEngine::new(checker.clone(), Duration::from_secs(5));
    (checker, Arc::new(engine))
}

async fn seed_user(pool: &PgPool) -> Uuid {
    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING user_id")
        .bind(format!("writer-{}", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn seed_competition(
    pool: &PgPool,
    max_paragraphs: i32,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Uuid {
    sqlx::query_scalar(
        r#"
        INSERT INTO competitions (title, description, start_date, end_date, max_paragraphs)
        VALUES ('Oceans', 'Why the oceans matter', $1, $2, $3)
        RETURNING competition_id
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(max_paragraphs)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn active_competition(pool: &PgPool, max_paragraphs: i32) -> Uuid {
    let now = Utc::now();
    seed_competition(
        pool,
        max_paragraphs,
        now - chrono::Duration::hours(1),
        now + chrono::Duration::hours(1),
    )
    .await
}

async fn started_essay(pool: &PgPool, max_paragraphs: i32) -> Essay {
    let user_id = seed_user(pool).await;
    let competition_id = active_competition(pool, max_paragraphs).await;
    service::start_essay(pool, user_id, competition_id, Utc::now())
        .await
        .unwrap()
        .essay
}

/// Inserts a finished essay with fixed timings and metrics
async fn finished_essay(
    pool: &PgPool,
    competition_id: Uuid,
    elapsed_secs: i64,
    word_count: i32,
    grammar_score: i32,
    spelling_errors: i32,
) -> Uuid {
    let user_id = seed_user(pool).await;
    let started_at = Utc::now() - chrono::Duration::hours(2);
    sqlx::query_scalar(
        r#"
        INSERT INTO essays (
            user_id, competition_id, status, started_at, completed_at,
            word_count, spelling_errors, grammar_score
        )
        VALUES ($1, $2, 'completed', $3, $4, $5, $6, $7)
        RETURNING essay_id
        "#,
    )
    .bind(user_id)
    .bind(competition_id)
    .bind(started_at)
    .bind(started_at + chrono::Duration::seconds(elapsed_secs))
    .bind(word_count)
    .bind(spelling_errors)
    .bind(grammar_score)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn stored_final_score(pool: &PgPool, essay_id: Uuid) -> Decimal {
    EssayRepository::new(pool)
        .find_by_id(essay_id)
        .await
        .unwrap()
        .final_score
}

fn is_invalid_state<T>(result: &Result<T, AnalysisError>) -> bool {
    matches!(
        result,
        Err(AnalysisError::StorageError(StorageError::InvalidState(_)))
    )
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn starting_twice_returns_the_same_essay(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let competition_id = active_competition(&pool, 3).await;

    let first = service::start_essay(&pool, user_id, competition_id, Utc::now())
        .await
        .unwrap();
    let second = service::start_essay(&pool, user_id, competition_id, Utc::now())
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.essay.essay_id, second.essay.essay_id);
    assert_eq!(second.essay.status, EssayStatus::InProgress);
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn essays_cannot_start_outside_the_window(pool: PgPool) {
    let user_id = seed_user(&pool).await;
    let now = Utc::now();
    let ended = seed_competition(
        &pool,
        3,
        now - chrono::Duration::hours(3),
        now - chrono::Duration::hours(1),
    )
    .await;

    let result = service::start_essay(&pool, user_id, ended, now).await;

    assert!(is_invalid_state(&result));
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn unknown_user_cannot_start_an_essay(pool: PgPool) {
    let competition_id = active_competition(&pool, 3).await;

    let result = service::start_essay(&pool, Uuid::new_v4(), competition_id, Utc::now()).await;

    assert!(matches!(
        result,
        Err(AnalysisError::StorageError(StorageError::NotFound))
    ));
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn last_paragraph_completes_the_essay(pool: PgPool) {
    let (checker, engine) = engine();
    let essay = started_essay(&pool, 2).await;

    let first = service::add_paragraph(&pool, &engine, essay.essay_id, "one two three", Utc::now())
        .await
        .unwrap();
    assert_eq!(first.essay.status, EssayStatus::InProgress);
    assert_eq!(first.paragraph.paragraph_order, 1);
    assert_eq!(checker.calls.load(Ordering::SeqCst), 0);

    let last = service::add_paragraph(&pool, &engine, essay.essay_id, "four five", Utc::now())
        .await
        .unwrap();
    assert_eq!(last.paragraph.paragraph_order, 2);
    assert_eq!(last.paragraph_count, 2);
    assert_eq!(last.essay.status, EssayStatus::Completed);
    assert!(last.essay.completed_at.is_some());
    assert_eq!(last.essay.word_count, 5);
    assert_eq!(last.essay.spelling_errors, 1);
    assert_eq!(last.essay.grammar_score, 98);
    assert_eq!(checker.calls.load(Ordering::SeqCst), 1);

    let after = service::add_paragraph(&pool, &engine, essay.essay_id, "six", Utc::now()).await;
    assert!(is_invalid_state(&after));
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn concurrent_appends_respect_the_paragraph_limit(pool: PgPool) {
    let (checker, engine) = engine();
    let essay = started_essay(&pool, 2).await;
    service::add_paragraph(&pool, &engine, essay.essay_id, "one two three", Utc::now())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        let engine = engine.clone();
        let essay_id = essay.essay_id;
        handles.push(tokio::spawn(async move {
            service::add_paragraph(&pool, &engine, essay_id, "four five", Utc::now()).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        let result = handle.await.unwrap();
        if result.is_ok() {
            accepted += 1;
        } else {
            assert!(is_invalid_state(&result));
        }
    }

    let stored = ParagraphRepository::new(&pool)
        .list_by_essay(essay.essay_id)
        .await
        .unwrap();
    let stored_words: usize = stored
        .iter()
        .map(|p| p.content.split_whitespace().count())
        .sum();
    let reloaded = EssayRepository::new(&pool)
        .find_by_id(essay.essay_id)
        .await
        .unwrap();

    assert_eq!(accepted, 1);
    assert_eq!(stored.len(), 2);
    assert_eq!(reloaded.status, EssayStatus::Completed);
    assert_eq!(reloaded.word_count as usize, stored_words);
    assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn completion_runs_grammar_once_and_is_a_noop_afterwards(pool: PgPool) {
    let (checker, engine) = engine();
    let essay = started_essay(&pool, 5).await;
    service::add_paragraph(&pool, &engine, essay.essay_id, "Their is a tide.", Utc::now())
        .await
        .unwrap();

    let completed = service::complete_essay(&pool, &engine, essay.essay_id)
        .await
        .unwrap();
    assert_eq!(completed.status, EssayStatus::Completed);
    assert_eq!(completed.word_count, 4);
    assert_eq!(checker.calls.load(Ordering::SeqCst), 1);

    let again = service::complete_essay(&pool, &engine, essay.essay_id)
        .await
        .unwrap();
    assert_eq!(again.completed_at, completed.completed_at);
    assert_eq!(checker.calls.load(Ordering::SeqCst), 1);

    service::lock_essay(&pool, essay.essay_id).await.unwrap();
    let locked = service::complete_essay(&pool, &engine, essay.essay_id)
        .await
        .unwrap();
    assert_eq!(locked.status, EssayStatus::Locked);
    assert_eq!(locked.completed_at, completed.completed_at);
    assert_eq!(checker.calls.load(Ordering::SeqCst), 1);
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn unlock_restores_the_previous_state(pool: PgPool) {
    let (_, engine) = engine();

    let draft = started_essay(&pool, 5).await;
    service::lock_essay(&pool, draft.essay_id).await.unwrap();
    let reopened = service::unlock_essay(&pool, draft.essay_id).await.unwrap();
    assert_eq!(reopened.status, EssayStatus::InProgress);
    assert!(reopened.completed_at.is_none());

    let finished = started_essay(&pool, 5).await;
    service::complete_essay(&pool, &engine, finished.essay_id)
        .await
        .unwrap();
    let locked = service::lock_essay(&pool, finished.essay_id).await.unwrap();
    assert_eq!(locked.status, EssayStatus::Locked);
    assert!(locked.completed_at.is_some());
    let restored = service::unlock_essay(&pool, finished.essay_id).await.unwrap();
    assert_eq!(restored.status, EssayStatus::Completed);

    let not_locked = service::unlock_essay(&pool, finished.essay_id).await;
    assert!(is_invalid_state(&not_locked));
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn score_essay_persists_the_final_score(pool: PgPool) {
    let competition_id = active_competition(&pool, 5).await;
    let worked = finished_essay(&pool, competition_id, 600, 500, 90, 2).await;
    let best = finished_essay(&pool, competition_id, 300, 1000, 100, 0).await;

    let breakdown = service::score_essay(&pool, worked).await.unwrap().unwrap();

    assert_eq!(breakdown.final_score, Decimal::new(7080, 2));
    assert_eq!(stored_final_score(&pool, worked).await, Decimal::new(7080, 2));
    assert_eq!(stored_final_score(&pool, best).await, Decimal::ZERO);
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn score_essay_skips_unfinished_essays(pool: PgPool) {
    let essay = started_essay(&pool, 5).await;

    let breakdown = service::score_essay(&pool, essay.essay_id).await.unwrap();

    assert!(breakdown.is_none());
    assert_eq!(stored_final_score(&pool, essay.essay_id).await, Decimal::ZERO);
}

#[sqlx::test(migrations = "../storage/migrations")]
#[ignore] // Only run when Postgres is available
async fn recompute_persists_every_finished_essay(pool: PgPool) {
    let competition_id = active_competition(&pool, 5).await;
    let worked = finished_essay(&pool, competition_id, 600, 500, 90, 2).await;
    let best = finished_essay(&pool, competition_id, 300, 1000, 100, 0).await;
    let draft = service::start_essay(&pool, seed_user(&pool).await, competition_id, Utc::now())
        .await
        .unwrap()
        .essay;

    let summary = service::recompute_competition_scores(&pool, competition_id)
        .await
        .unwrap();

    assert_eq!(summary.recomputed_count, 2);
    let extremes = summary.extremes.unwrap();
    assert_eq!(extremes.fastest_time_seconds(), Decimal::from(300));
    assert_eq!(extremes.max_words, 1000);
    assert_eq!(stored_final_score(&pool, worked).await, Decimal::new(7080, 2));
    assert_eq!(stored_final_score(&pool, best).await, Decimal::new(10000, 2));
    assert_eq!(stored_final_score(&pool, draft.essay_id).await, Decimal::ZERO);

    let again = service::recompute_competition_scores(&pool, competition_id)
        .await
        .unwrap();
    assert_eq!(again.recomputed_count, 2);
    assert_eq!(stored_final_score(&pool, worked).await, Decimal::new(7080, 2));
}
