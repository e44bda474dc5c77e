use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use focuswave_api::dashboard::{
    AnalyticsSource, DashboardConfig, DashboardStore, HttpAnalyticsSource, Metric, SourceError,
};

const TOKEN: &str = "dashboard-token";

#[derive(Deserialize)]
struct DaysQuery {
    days: u32,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

async fn focus_minutes(headers: HeaderMap, Query(q): Query<DaysQuery>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    assert_eq!(q.days, 7);
    Json(json!([
        { "date": today(), "minutes": 50, "isToday": true },
        { "minutes": 99 },
    ]))
    .into_response()
}

async fn task_throughput() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn mood_focus(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([{ "mood": "focused", "focusMinutes": 42.4 }])).into_response()
}

async fn object_body() -> Response {
    Json(json!({ "data": [] })).into_response()
}

async fn html_body() -> Response {
    (StatusCode::OK, "<html>maintenance</html>").into_response()
}

async fn spawn_fake_api(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn fake_api() -> Router {
    Router::new()
        .route("/api/analytics/focus-minutes", get(focus_minutes))
        .route("/api/analytics/task-throughput", get(task_throughput))
        .route("/api/analytics/mood-focus", get(mood_focus))
}

fn source_config(addr: SocketAddr, token: &str) -> DashboardConfig {
    let mut config = DashboardConfig::new(format!("http://{addr}/api"), token);
    config.request_timeout = Duration::from_secs(5);
    config
}

#[tokio::test]
async fn http_source_returns_array_and_sends_token() {
    let addr = spawn_fake_api(fake_api()).await;
    let source = HttpAnalyticsSource::new(&source_config(addr, TOKEN)).unwrap();

    let records = source.fetch(Metric::FocusMinutes, 7).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["minutes"], 50);
}

#[tokio::test]
async fn http_source_maps_status_errors() {
    let addr = spawn_fake_api(fake_api()).await;

    let source = HttpAnalyticsSource::new(&source_config(addr, TOKEN)).unwrap();
    let err = source.fetch(Metric::TaskThroughput, 7).await.unwrap_err();
    assert!(matches!(err, SourceError::Status(s) if s.as_u16() == 500));

    let unauthenticated = HttpAnalyticsSource::new(&source_config(addr, "wrong")).unwrap();
    let err = unauthenticated.fetch(Metric::MoodFocus, 7).await.unwrap_err();
    assert!(matches!(err, SourceError::Status(s) if s.as_u16() == 401));
}

#[tokio::test]
async fn http_source_rejects_non_array_body() {
    let router = Router::new().route("/api/analytics/mood-focus", get(object_body));
    let addr = spawn_fake_api(router).await;
    let source = HttpAnalyticsSource::new(&source_config(addr, TOKEN)).unwrap();

    let err = source.fetch(Metric::MoodFocus, 7).await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn http_source_rejects_invalid_json_body() {
    let router = Router::new().route("/api/analytics/focus-minutes", get(html_body));
    let addr = spawn_fake_api(router).await;
    let source = HttpAnalyticsSource::new(&source_config(addr, TOKEN)).unwrap();

    let err = source.fetch(Metric::FocusMinutes, 7).await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn http_source_reports_transport_errors() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = HttpAnalyticsSource::new(&source_config(addr, TOKEN)).unwrap();
    let err = source.fetch(Metric::FocusMinutes, 7).await.unwrap_err();
    assert!(matches!(err, SourceError::Transport(_)));
}

#[tokio::test]
async fn store_reconciles_partial_failure() {
    let addr = spawn_fake_api(fake_api()).await;
    let source = HttpAnalyticsSource::new(&source_config(addr, TOKEN)).unwrap();
    let store = DashboardStore::new(source, 7);

    let version = store.refresh().await;
    let state = store.current();
    assert_eq!(version, 1);
    assert!(!state.loading);

    let focus = &state.model.focus_data;
    assert_eq!(focus.len(), 7);
    assert_eq!(focus.last().unwrap().minutes, 50);
    assert!(focus.last().unwrap().is_today);
    assert!(focus[..6].iter().all(|p| p.minutes == 0 && !p.is_today));

    let tasks = &state.model.task_data;
    assert_eq!(tasks.len(), 7);
    assert!(tasks.iter().all(|p| p.created == 0 && p.completed == 0));
    assert_eq!(tasks.last().unwrap().date.format("%Y-%m-%d").to_string(), today());

    assert_eq!(state.model.mood_data.len(), 1);
    assert_eq!(state.model.mood_data[0].mood, "Focused");
    assert_eq!(state.model.mood_data[0].focus_minutes, 42);

    assert_eq!(state.failures.tasks, 1);
    assert_eq!(state.failures.focus, 0);
    assert_eq!(state.failures.total, 0);
}

#[tokio::test]
async fn store_from_config_fetches_configured_window() {
    let addr = spawn_fake_api(fake_api()).await;
    let mut config = source_config(addr, TOKEN);
    config.poll_interval = Duration::from_secs(3600);

    let store = DashboardStore::from_config(&config).unwrap();
    assert_eq!(store.days(), 7);
    assert_eq!(store.poll_interval(), Duration::from_secs(3600));

    let (tx, rx) = tokio::sync::watch::channel(false);
    let mut updates = store.subscribe();
    let poller = store.spawn_poller(rx);
    tokio::time::timeout(
        Duration::from_secs(10),
        updates.wait_for(|state| state.version >= 1),
    )
    .await
    .expect("poller never refreshed")
    .unwrap();

    let state = store.current();
    assert_eq!(state.model.focus_data.last().unwrap().minutes, 50);
    assert_eq!(state.failures.tasks, 1);

    tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(10), poller)
        .await
        .expect("poller did not stop")
        .unwrap();
}
