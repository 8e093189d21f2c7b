use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::competition::CreateCompetitionRequest;
use crate::error::{Result, StorageError};
use crate::models::Competition;

const COMPETITION_COLUMNS: &str = r#"
    competition_id, title, description, start_date, end_date, max_paragraphs, created_at
"#;

/// Repository for Competition database operations
pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    /// Create a new CompetitionRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a competition by ID
    pub async fn find_by_id(&self, competition_id: Uuid) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions WHERE competition_id = $1"
        ))
        .bind(competition_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(competition)
    }

    /// Competitions whose end date is before `now`, most recent first
    pub async fn list_ended(&self, now: DateTime<Utc>) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(&format!(
            r#"
            SELECT {COMPETITION_COLUMNS}
            FROM competitions
            WHERE end_date < $1
            ORDER BY end_date DESC
            "#
        ))
        .bind(now)
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    /// All competitions, latest start first
    pub async fn list_all(&self) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COMPETITION_COLUMNS} FROM competitions ORDER BY start_date DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    pub async fn create(&self, request: &CreateCompetitionRequest) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(&format!(
            r#"
            INSERT INTO competitions (title, description, start_date, end_date, max_paragraphs)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(request.title.trim())
        .bind(request.description.trim())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.max_paragraphs)
        .fetch_one(self.pool)
        .await?;

        Ok(competition)
    }
}
