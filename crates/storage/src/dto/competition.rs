use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{Competition, CompetitionPhase};

/// Request payload for creating a new competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_window"))]
pub struct CreateCompetitionRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    #[validate(custom(function = "validate_not_blank"))]
    pub description: String,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    #[validate(range(min = 1, message = "A competition needs at least one paragraph"))]
    pub max_paragraphs: i32,
}

/// Competition as listed to participants
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionSummary {
    pub competition_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_paragraphs: i32,
    pub phase: CompetitionPhase,
}

impl CompetitionSummary {
    pub fn from_competition(competition: Competition, now: DateTime<Utc>) -> Self {
        let phase = competition.phase(now);
        Self {
            competition_id: competition.competition_id,
            title: competition.title,
            description: competition.description,
            start_date: competition.start_date,
            end_date: competition.end_date,
            max_paragraphs: competition.max_paragraphs,
            phase,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionListResponse {
    pub competitions: Vec<CompetitionSummary>,
}

/// Request payload for starting (or resuming) an essay in a competition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StartEssayRequest {
    pub user_id: Uuid,
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

fn validate_window(request: &CreateCompetitionRequest) -> Result<(), ValidationError> {
    if request.end_date <= request.start_date {
        let mut error = ValidationError::new("invalid_window");
        error.message = Some("End date must be after start date".into());
        return Err(error);
    }
    Ok(())
}
