use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreBreakdownResponse {
    pub essay_id: Uuid,
    pub speed_score: Decimal,
    pub word_score: Decimal,
    pub grammar_score: Decimal,
    pub spelling_score: Decimal,
    pub final_score: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecomputeScoresResponse {
    pub competition_id: Uuid,
    pub recomputed_count: u64,
    /// Shortest completion time among completed essays, in seconds
    pub fastest_time_seconds: Option<Decimal>,
    pub max_words: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicRelevanceResponse {
    pub essay_id: Uuid,
    pub topic: String,
    /// Cosine similarity in [-1, 1]
    pub similarity: f64,
}
