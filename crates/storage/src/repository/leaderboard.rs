use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::dto::leaderboard::LeaderboardEntry;
use crate::error::Result;

#[derive(FromRow)]
struct LeaderboardRow {
    rank: i64,
    essay_id: Uuid,
    user_id: Uuid,
    username: String,
    final_score: Decimal,
    word_count: i32,
    grammar_score: i32,
    completed_at: Option<DateTime<Utc>>,
}

pub struct LeaderboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeaderboardRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Finished essays ranked by final score, ties broken by the earlier
    /// completion and then the longer essay
    pub async fn get_competition_leaderboard(
        &self,
        competition_id: Uuid,
    ) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT
                ROW_NUMBER() OVER (
                    ORDER BY e.final_score DESC, e.completed_at ASC, e.word_count DESC
                ) AS rank,
                e.essay_id,
                e.user_id,
                u.username,
                e.final_score,
                e.word_count,
                e.grammar_score,
                e.completed_at
            FROM essays e
            INNER JOIN users u ON u.user_id = e.user_id
            WHERE e.competition_id = $1
              AND e.status IN ('completed', 'locked')
            ORDER BY rank
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        let entries = rows
            .into_iter()
            .map(|row| LeaderboardEntry {
                rank: row.rank,
                essay_id: row.essay_id,
                user_id: row.user_id,
                username: row.username,
                final_score: row.final_score,
                word_count: row.word_count,
                grammar_score: row.grammar_score,
                completed_at: row.completed_at,
            })
            .collect();

        Ok(entries)
    }
}
