use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::UpdateBugRequest;

/// A reported bug, as stored by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub report_time: DateTime<Utc>,
}

impl Bug {
    /// Create a bug with a freshly generated id.
    pub fn new(title: String, description: String, report_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            report_time,
        }
    }

    /// Apply a partial update. Absent fields keep their stored value.
    pub fn apply(self, update: UpdateBugRequest) -> Self {
        Self {
            title: update.title.unwrap_or(self.title),
            description: update.description.unwrap_or(self.description),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_absent_fields() {
        let bug = Bug::new("Crash".to_string(), "On start".to_string(), Utc::now());
        let updated = bug.clone().apply(UpdateBugRequest {
            title: None,
            description: Some("On resume".to_string()),
        });

        assert_eq!(updated.id, bug.id);
        assert_eq!(updated.title, "Crash");
        assert_eq!(updated.description, "On resume");
        assert_eq!(updated.report_time, bug.report_time);
    }
}
