use axum::{
    extract::{Query, State},
    Extension, Json,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::config::Config;
use crate::dto::{AnalyticsQuery, FocusMinutesPoint, MoodFocusPoint, TaskThroughputPoint};
use crate::error::{AppError, AppResult};
use crate::models::focus_session::FocusSession;
use crate::models::mood::MoodEntry;
use crate::models::task::Task;
use crate::services::analytics::{self, AnalyticsWindow};
use crate::AppState;

fn resolve_window(query: &AnalyticsQuery, config: &Config) -> AppResult<AnalyticsWindow> {
    query.validate()?;
    let days = query.days.unwrap_or(config.analytics_default_days);
    if days > config.analytics_max_days {
        return Err(AppError::Validation(format!(
            "days must be at most {}",
            config.analytics_max_days
        )));
    }
    Ok(AnalyticsWindow::ending_today(days))
}

async fn load_work_sessions(
    db: &PgPool,
    user_id: Uuid,
    window: &AnalyticsWindow,
) -> Result<Vec<FocusSession>, sqlx::Error> {
    sqlx::query_as::<_, FocusSession>(
        r#"
        SELECT id, user_id, session_type, duration_seconds, completed_at
        FROM focus_sessions
        WHERE user_id = $1
          AND session_type = 'work'
          AND completed_at >= $2 AND completed_at < $3
        ORDER BY completed_at ASC
        "#,
    )
    .bind(user_id)
    .bind(window.starts_at())
    .bind(window.ends_before())
    .fetch_all(db)
    .await
}

/// GET /api/analytics/focus-minutes
pub async fn focus_minutes(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<Vec<FocusMinutesPoint>>> {
    let window = resolve_window(&query, &state.config)?;
    let sessions = load_work_sessions(&state.db, auth_user.id, &window).await?;

    let series = analytics::focus_minutes(&window, &sessions);

    tracing::debug!(
        user_id = %auth_user.id,
        start = %window.start(),
        days = window.day_count(),
        sessions = sessions.len(),
        "Focus minutes series computed"
    );
    Ok(Json(series))
}

/// GET /api/analytics/task-throughput
pub async fn task_throughput(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<Vec<TaskThroughputPoint>>> {
    let window = resolve_window(&query, &state.config)?;

    let tasks = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, status, created_at, updated_at
        FROM tasks
        WHERE user_id = $1
          AND (
            (created_at >= $2 AND created_at < $3)
            OR (status = 'completed' AND updated_at >= $2 AND updated_at < $3)
          )
        "#,
    )
    .bind(auth_user.id)
    .bind(window.starts_at())
    .bind(window.ends_before())
    .fetch_all(&state.db)
    .await?;

    let series = analytics::task_throughput(&window, &tasks);

    tracing::debug!(
        user_id = %auth_user.id,
        start = %window.start(),
        days = window.day_count(),
        tasks = tasks.len(),
        "Task throughput series computed"
    );
    Ok(Json(series))
}

/// GET /api/analytics/mood-focus
pub async fn mood_focus(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<AnalyticsQuery>,
) -> AppResult<Json<Vec<MoodFocusPoint>>> {
    let window = resolve_window(&query, &state.config)?;

    let moods = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT id, user_id, mood, created_at
        FROM mood_logs
        WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
        "#,
    )
    .bind(auth_user.id)
    .bind(window.starts_at())
    .bind(window.ends_before())
    .fetch_all(&state.db)
    .await?;

    // Moods only pair with sessions from their own day, so nothing outside
    // the window can contribute.
    let sessions = if moods.is_empty() {
        Vec::new()
    } else {
        load_work_sessions(&state.db, auth_user.id, &window).await?
    };

    let series = analytics::mood_focus(&window, &moods, &sessions);

    tracing::debug!(
        user_id = %auth_user.id,
        start = %window.start(),
        moods = moods.len(),
        labels = series.len(),
        "Mood focus correlation computed"
    );
    Ok(Json(series))
}
