//! Bug-related request models.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::validators::validate_not_blank;

/// Request payload for reporting a new bug
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBugRequest {
    /// Short title (1-10 characters)
    #[validate(
        length(max = 10, message = "Title too long."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Crash")]
    pub title: String,
    /// Description (max 144 characters)
    #[validate(length(max = 144, message = "Description too long."))]
    #[schema(example = "The app crashes when opening the settings page")]
    pub description: String,
    /// When the bug was observed. Defaults to now.
    #[schema(example = "2024-01-15T10:30:00Z")]
    pub report_time: Option<DateTime<Utc>>,
}

/// Request payload for updating a bug
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBugRequest {
    /// New title (1-10 characters)
    #[validate(
        length(max = 10, message = "Title too long."),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Freeze")]
    pub title: Option<String>,
    /// New description (max 144 characters)
    #[validate(length(max = 144, message = "Description too long."))]
    #[schema(example = "The app freezes instead of crashing")]
    pub description: Option<String>,
}
