use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One paragraph of an essay; `paragraph_order` is 1-based and contiguous
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Paragraph {
    pub paragraph_id: Uuid,
    pub essay_id: Uuid,
    pub paragraph_order: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
