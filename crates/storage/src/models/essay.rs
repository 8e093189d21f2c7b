use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum EssayStatus {
    InProgress,
    Completed,
    Locked,
}

impl EssayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Locked => "locked",
        }
    }
}

impl fmt::Display for EssayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single writing attempt by one participant in one competition.
///
/// `word_count`, the grammar fields and `final_score` are derived values:
/// they are filled in at completion time and by final scoring.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Essay {
    pub essay_id: Uuid,
    pub user_id: Uuid,
    pub competition_id: Uuid,
    pub status: EssayStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub word_count: i32,
    pub grammar_errors: i32,
    pub spelling_errors: i32,
    pub grammar_score: i32,
    pub final_score: Decimal,
}

impl Essay {
    pub fn is_in_progress(&self) -> bool {
        self.status == EssayStatus::InProgress
    }

    /// Another paragraph fits while the essay is open and under the limit
    pub fn can_add_paragraph(&self, paragraph_count: i64, max_paragraphs: i32) -> bool {
        self.is_in_progress() && paragraph_count < i64::from(max_paragraphs)
    }

    /// Time spent writing, known only once the essay is completed
    pub fn elapsed(&self) -> Option<Duration> {
        self.completed_at.map(|completed| completed - self.started_at)
    }
}
