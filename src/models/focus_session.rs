use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FocusSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_type: SessionType,
    pub duration_seconds: i32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "session_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Work,
    Break,
}

impl FocusSession {
    pub fn is_work(&self) -> bool {
        self.session_type == SessionType::Work
    }

    pub fn minutes(&self) -> f64 {
        f64::from(self.duration_seconds) / 60.0
    }
}
