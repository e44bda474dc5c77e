use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{
    CoachRequest, DistractionPredictRequest, MlEnvelope, MoodSuggestionsRequest,
    RecommendPomodoroRequest, SentimentRequest,
};
use crate::error::{AppError, AppResult};
use crate::ml::MlEndpoint;
use crate::AppState;

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/ml/health: probes the service now instead of reporting the
/// last scheduled result.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let status = state.ml.check_health().await;

    Json(json!({
        "ml_service_url": state.ml.base_url(),
        "connected": status.connected,
        "last_check": status.last_check,
        "error": status.error,
        "fallbacks": state.ml.fallbacks().snapshot(),
    }))
}

/// POST /api/ml/recommend-pomodoro
pub async fn recommend_pomodoro(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<RecommendPomodoroRequest>,
) -> AppResult<Json<MlEnvelope<Value>>> {
    body.validate()?;

    let upstream = json!({
        "user_id": auth_user.id,
        "task_priority": body.task_priority,
    });
    let data = state
        .ml
        .forward_or_fallback(MlEndpoint::RecommendPomodoro, &upstream)
        .await;
    Ok(Json(MlEnvelope::ok(data)))
}

/// POST /api/ml/sentiment
pub async fn sentiment(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Json(body): Json<SentimentRequest>,
) -> AppResult<Json<MlEnvelope<Value>>> {
    let text = non_empty(body.text).ok_or(AppError::BadRequest("Text is required".into()))?;

    let data = state
        .ml
        .forward_or_fallback(MlEndpoint::Sentiment, &json!({ "text": text }))
        .await;
    Ok(Json(MlEnvelope::ok(data)))
}

/// POST /api/ml/coach
pub async fn coach(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CoachRequest>,
) -> AppResult<Json<MlEnvelope<Value>>> {
    let upstream = json!({
        "user_id": auth_user.id,
        "context": body.context.unwrap_or_else(|| json!({})),
    });
    let data = state
        .ml
        .forward_or_fallback(MlEndpoint::Coach, &upstream)
        .await;
    Ok(Json(MlEnvelope::ok(data)))
}

/// POST /api/ml/distraction-predict
pub async fn distraction_predict(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<DistractionPredictRequest>,
) -> AppResult<Json<MlEnvelope<Value>>> {
    body.validate()?;

    let upstream = json!({
        "user_id": auth_user.id,
        "session_duration": body.session_duration,
    });
    let data = state
        .ml
        .forward_or_fallback(MlEndpoint::DistractionPredict, &upstream)
        .await;
    Ok(Json(MlEnvelope::ok(data)))
}

/// POST /api/ml/mood-suggestions
pub async fn mood_suggestions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<MoodSuggestionsRequest>,
) -> AppResult<Json<MlEnvelope<Value>>> {
    let mood = non_empty(body.mood).ok_or(AppError::BadRequest("Mood is required".into()))?;

    let upstream = json!({
        "user_id": auth_user.id,
        "mood": mood,
        "note": body.note.unwrap_or_default(),
    });
    let data = state
        .ml
        .forward_or_fallback(MlEndpoint::MoodSuggestions, &upstream)
        .await;
    Ok(Json(MlEnvelope::ok(data)))
}
