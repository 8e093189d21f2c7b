use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::competition::validate_not_blank;
use crate::models::{Essay, EssayStatus, Paragraph};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddParagraphRequest {
    #[validate(length(
        min = 1,
        max = 10000,
        message = "content must be between 1 and 10000 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParagraphInfo {
    pub order: i32,
    pub content: String,
}

impl From<Paragraph> for ParagraphInfo {
    fn from(paragraph: Paragraph) -> Self {
        Self {
            order: paragraph.paragraph_order,
            content: paragraph.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EssayDetailResponse {
    pub essay_id: Uuid,
    pub username: String,
    pub competition: String,
    pub status: EssayStatus,
    pub word_count: i32,
    pub grammar_score: i32,
    pub grammar_errors: i32,
    pub spelling_errors: i32,
    pub final_score: Decimal,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub paragraphs: Vec<ParagraphInfo>,
}

/// Returned by lifecycle endpoints (add paragraph, complete, lock, unlock)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EssayStateResponse {
    pub essay_id: Uuid,
    pub status: EssayStatus,
    pub paragraph_count: i64,
    pub word_count: i32,
    pub grammar_errors: i32,
    pub spelling_errors: i32,
    pub grammar_score: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl EssayStateResponse {
    pub fn from_essay(essay: &Essay, paragraph_count: i64) -> Self {
        Self {
            essay_id: essay.essay_id,
            status: essay.status,
            paragraph_count,
            word_count: essay.word_count,
            grammar_errors: essay.grammar_errors,
            spelling_errors: essay.spelling_errors,
            grammar_score: essay.grammar_score,
            completed_at: essay.completed_at,
        }
    }
}
