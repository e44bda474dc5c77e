use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod ml;
pub mod models;
pub mod services;

use config::Config;
use ml::MlClient;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub ml: MlClient,
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/ml/health", get(handlers::ml::health));

    let protected_routes = Router::new()
        // Analytics
        .route(
            "/api/analytics/focus-minutes",
            get(handlers::analytics::focus_minutes),
        )
        .route(
            "/api/analytics/task-throughput",
            get(handlers::analytics::task_throughput),
        )
        .route(
            "/api/analytics/mood-focus",
            get(handlers::analytics::mood_focus),
        )
        // ML proxy
        .route(
            "/api/ml/recommend-pomodoro",
            post(handlers::ml::recommend_pomodoro),
        )
        .route("/api/ml/sentiment", post(handlers::ml::sentiment))
        .route("/api/ml/coach", post(handlers::ml::coach))
        .route(
            "/api/ml/distraction-predict",
            post(handlers::ml::distraction_predict),
        )
        .route(
            "/api/ml/mood-suggestions",
            post(handlers::ml::mood_suggestions),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn allowed_origins(config: &Config) -> Vec<HeaderValue> {
    std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}
