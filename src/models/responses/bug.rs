//! Bug response models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Bug;

/// Bug as returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BugResponse {
    /// Bug id
    pub id: Uuid,
    /// Short title
    #[schema(example = "Crash")]
    pub title: String,
    /// Description
    pub description: String,
    /// When the bug was observed
    pub report_time: DateTime<Utc>,
}

impl From<Bug> for BugResponse {
    fn from(bug: Bug) -> Self {
        Self {
            id: bug.id,
            title: bug.title,
            description: bug.description,
            report_time: bug.report_time,
        }
    }
}

/// Body returned after a successful delete
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedBugResponse {
    /// Id of the deleted bug
    pub id: Uuid,
}
