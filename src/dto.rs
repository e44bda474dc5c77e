//! # FocusWave: Request/Response DTOs
//!
//! All API contract types in one module.
//!
//! Conventions:
//! - `*Query` / `*Request` → deserialized from query string or JSON body
//! - `*Point` / `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros
//! - Analytics points use camelCase keys (`isToday`, `focusMinutes`), matching
//!   what the dashboard charts bind to

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// Analytics
// ============================================================================

/// GET /api/analytics/{metric}?days=N
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AnalyticsQuery {
    /// Lookback window in calendar days, today included. Default: 7
    #[validate(range(min = 1, message = "days must be a positive integer"))]
    pub days: Option<u32>,
}

/// One element of GET /api/analytics/focus-minutes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusMinutesPoint {
    pub date: NaiveDate,
    pub minutes: i64,
    pub is_today: bool,
}

/// One element of GET /api/analytics/task-throughput
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskThroughputPoint {
    pub date: NaiveDate,
    pub created: i64,
    pub completed: i64,
    pub is_today: bool,
}

/// One element of GET /api/analytics/mood-focus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodFocusPoint {
    pub mood: String,
    pub focus_minutes: i64,
}

// ============================================================================
// ML proxy
// ============================================================================

/// Every ML route answers with this envelope, fallback or not.
#[derive(Debug, Serialize, Deserialize)]
pub struct MlEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> MlEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// POST /api/ml/recommend-pomodoro
#[derive(Debug, Deserialize, Validate)]
pub struct RecommendPomodoroRequest {
    #[serde(default = "default_task_priority")]
    #[validate(length(min = 1, max = 20))]
    pub task_priority: String,
}

fn default_task_priority() -> String {
    "medium".into()
}

/// POST /api/ml/sentiment
#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /api/ml/coach
#[derive(Debug, Deserialize)]
pub struct CoachRequest {
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// POST /api/ml/distraction-predict
#[derive(Debug, Deserialize, Validate)]
pub struct DistractionPredictRequest {
    /// Planned session length in minutes. Default: 25
    #[serde(default = "default_session_duration")]
    #[validate(range(min = 1, max = 240))]
    pub session_duration: u32,
}

fn default_session_duration() -> u32 {
    25
}

/// POST /api/ml/mood-suggestions
#[derive(Debug, Deserialize)]
pub struct MoodSuggestionsRequest {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}
