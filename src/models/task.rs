use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task status as written by the task service. Values are matched exactly,
/// the same way the analytics queries filter on `status = 'completed'`; the
/// column is free text, so anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Other(String),
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "in_progress" | "in-progress" => Self::InProgress,
            "completed" => Self::Completed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from(self.status.as_str())
    }

    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(TaskStatus::from("completed"), TaskStatus::Completed);
        assert_eq!(TaskStatus::from("pending"), TaskStatus::Pending);
        assert_eq!(TaskStatus::from("in_progress"), TaskStatus::InProgress);
        assert_eq!(
            TaskStatus::from("blocked"),
            TaskStatus::Other("blocked".into())
        );
    }

    #[test]
    fn test_status_is_matched_exactly() {
        assert_eq!(
            TaskStatus::from(" Completed "),
            TaskStatus::Other(" Completed ".into())
        );
        assert_eq!(
            TaskStatus::from("Completed"),
            TaskStatus::Other("Completed".into())
        );
    }

    #[test]
    fn test_is_completed_requires_exact_status() {
        let now = Utc::now();
        let task = |status: &str| Task {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            status: status.into(),
            created_at: now,
            updated_at: now,
        };
        assert!(task("completed").is_completed());
        assert!(!task(" Completed ").is_completed());
        assert!(!task("COMPLETED").is_completed());
        assert!(!task("pending").is_completed());
    }
}
