use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub essay_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub final_score: Decimal,
    pub word_count: i32,
    pub grammar_score: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub competition_id: Uuid,
    pub title: String,
    pub entries: Vec<LeaderboardEntry>,
}
