use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Where a competition stands relative to its writing window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionPhase {
    Upcoming,
    Active,
    Ended,
}

/// Time-boxed essay writing competition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub competition_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_paragraphs: i32,
    pub created_at: DateTime<Utc>,
}

impl Competition {
    /// Participants may write while `start_date <= now <= end_date`
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_date
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }

    pub fn phase(&self, now: DateTime<Utc>) -> CompetitionPhase {
        if !self.has_started(now) {
            CompetitionPhase::Upcoming
        } else if self.has_ended(now) {
            CompetitionPhase::Ended
        } else {
            CompetitionPhase::Active
        }
    }

    /// Prompt text used as the topic for relevance scoring
    pub fn topic(&self) -> String {
        format!("{}. {}", self.title.trim(), self.description.trim())
    }
}
