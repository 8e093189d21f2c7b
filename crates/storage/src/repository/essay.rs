use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::dto::essay::{EssayDetailResponse, ParagraphInfo};
use crate::error::{Result, StorageError};
use crate::models::{Essay, EssayStatus};
use crate::repository::paragraph::ParagraphRepository;

const ESSAY_COLUMNS: &str = r#"
    essay_id, user_id, competition_id, status, started_at, completed_at,
    word_count, grammar_errors, spelling_errors, grammar_score, final_score
"#;

#[derive(FromRow)]
struct EssayHeaderRow {
    username: String,
    competition_title: String,
}

/// Repository for Essay database operations
pub struct EssayRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EssayRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, essay_id: Uuid) -> Result<Essay> {
        let essay = sqlx::query_as::<_, Essay>(&format!(
            "SELECT {ESSAY_COLUMNS} FROM essays WHERE essay_id = $1"
        ))
        .bind(essay_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(essay)
    }

    /// Loads the essay and holds its row lock until the caller's
    /// transaction ends. Paragraph appends and completion go through here.
    pub async fn lock_for_update(&self, conn: &mut PgConnection, essay_id: Uuid) -> Result<Essay> {
        let essay = sqlx::query_as::<_, Essay>(&format!(
            "SELECT {ESSAY_COLUMNS} FROM essays WHERE essay_id = $1 FOR UPDATE"
        ))
        .bind(essay_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(essay)
    }

    /// Returns the participant's essay for a competition, starting one if
    /// none exists. The flag is `true` when the essay was created here.
    pub async fn get_or_create(
        &self,
        user_id: Uuid,
        competition_id: Uuid,
    ) -> Result<(Essay, bool)> {
        let inserted = sqlx::query_as::<_, Essay>(&format!(
            r#"
            INSERT INTO essays (user_id, competition_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, competition_id) DO NOTHING
            RETURNING {ESSAY_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(competition_id)
        .fetch_optional(self.pool)
        .await
        .map_err(StorageError::from)
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                StorageError::NotFound
            } else {
                e
            }
        })?;

        if let Some(essay) = inserted {
            return Ok((essay, true));
        }

        let existing = sqlx::query_as::<_, Essay>(&format!(
            "SELECT {ESSAY_COLUMNS} FROM essays WHERE user_id = $1 AND competition_id = $2"
        ))
        .bind(user_id)
        .bind(competition_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok((existing, false))
    }

    /// Essay with author, competition title and paragraphs
    pub async fn find_detail(&self, essay_id: Uuid) -> Result<EssayDetailResponse> {
        let essay = self.find_by_id(essay_id).await?;

        let header = sqlx::query_as::<_, EssayHeaderRow>(
            r#"
            SELECT u.username, c.title AS competition_title
            FROM essays e
            INNER JOIN users u ON u.user_id = e.user_id
            INNER JOIN competitions c ON c.competition_id = e.competition_id
            WHERE e.essay_id = $1
            "#,
        )
        .bind(essay_id)
        .fetch_one(self.pool)
        .await?;

        let paragraphs = ParagraphRepository::new(self.pool)
            .list_by_essay(essay_id)
            .await?
            .into_iter()
            .map(ParagraphInfo::from)
            .collect();

        Ok(EssayDetailResponse {
            essay_id: essay.essay_id,
            username: header.username,
            competition: header.competition_title,
            status: essay.status,
            word_count: essay.word_count,
            grammar_score: essay.grammar_score,
            grammar_errors: essay.grammar_errors,
            spelling_errors: essay.spelling_errors,
            final_score: essay.final_score,
            started_at: essay.started_at,
            completed_at: essay.completed_at,
            paragraphs,
        })
    }

    /// All completed or locked essays of a competition, read in one statement
    /// so that competition-wide extremes come from a single snapshot
    pub async fn list_finished_by_competition(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<Essay>> {
        let essays = sqlx::query_as::<_, Essay>(&format!(
            r#"
            SELECT {ESSAY_COLUMNS}
            FROM essays
            WHERE competition_id = $1
              AND status IN ('completed', 'locked')
              AND completed_at IS NOT NULL
            ORDER BY completed_at ASC
            "#
        ))
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(essays)
    }

    /// Persists the fields set when an essay transitions to completed
    pub async fn save_completion(&self, conn: &mut PgConnection, essay: &Essay) -> Result<Essay> {
        let saved = sqlx::query_as::<_, Essay>(&format!(
            r#"
            UPDATE essays
            SET status = $1,
                completed_at = $2,
                word_count = $3,
                grammar_errors = $4,
                spelling_errors = $5,
                grammar_score = $6
            WHERE essay_id = $7 AND status = 'in_progress'
            RETURNING {ESSAY_COLUMNS}
            "#
        ))
        .bind(essay.status)
        .bind(essay.completed_at)
        .bind(essay.word_count)
        .bind(essay.grammar_errors)
        .bind(essay.spelling_errors)
        .bind(essay.grammar_score)
        .bind(essay.essay_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            StorageError::InvalidState("essay is no longer in progress".to_string())
        })?;

        Ok(saved)
    }

    pub async fn update_final_score(&self, essay_id: Uuid, final_score: Decimal) -> Result<()> {
        sqlx::query("UPDATE essays SET final_score = $1 WHERE essay_id = $2")
            .bind(final_score)
            .bind(essay_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Writes a batch of final scores atomically
    pub async fn update_final_scores(&self, scores: &[(Uuid, Decimal)]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut updated = 0u64;

        for (essay_id, final_score) in scores {
            let result = sqlx::query("UPDATE essays SET final_score = $1 WHERE essay_id = $2")
                .bind(final_score)
                .bind(essay_id)
                .execute(&mut *tx)
                .await?;
            updated += result.rows_affected();
        }

        tx.commit().await?;

        Ok(updated)
    }

    /// Moderation lock; the essay keeps its `completed_at`
    pub async fn lock(&self, essay_id: Uuid) -> Result<Essay> {
        let essay = sqlx::query_as::<_, Essay>(&format!(
            r#"
            UPDATE essays
            SET status = $1
            WHERE essay_id = $2
            RETURNING {ESSAY_COLUMNS}
            "#
        ))
        .bind(EssayStatus::Locked)
        .bind(essay_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(essay)
    }

    /// Lifts a lock, back to `completed` when the essay was finished and to
    /// `in_progress` otherwise. `None` when the essay is not locked.
    pub async fn unlock(&self, essay_id: Uuid) -> Result<Option<Essay>> {
        let essay = sqlx::query_as::<_, Essay>(&format!(
            r#"
            UPDATE essays
            SET status = CASE
                WHEN completed_at IS NOT NULL THEN 'completed'
                ELSE 'in_progress'
            END
            WHERE essay_id = $1 AND status = 'locked'
            RETURNING {ESSAY_COLUMNS}
            "#
        ))
        .bind(essay_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(essay)
    }
}
