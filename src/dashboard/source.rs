use std::env;
use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

use crate::services::analytics::MAX_WINDOW_DAYS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    FocusMinutes,
    TaskThroughput,
    MoodFocus,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::FocusMinutes, Metric::TaskThroughput, Metric::MoodFocus];

    pub fn path(&self) -> &'static str {
        match self {
            Metric::FocusMinutes => "focus-minutes",
            Metric::TaskThroughput => "task-throughput",
            Metric::MoodFocus => "mood-focus",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("analytics API returned {0}")]
    Status(reqwest::StatusCode),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Where the dashboard gets its raw series from. Each call either yields the
/// JSON array the analytics API returned or fails on its own.
pub trait AnalyticsSource: Send + Sync + 'static {
    fn fetch(
        &self,
        metric: Metric,
        days: u32,
    ) -> impl Future<Output = Result<Vec<Value>, SourceError>> + Send;
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base of the REST API, e.g. `http://localhost:5000/api`.
    pub api_base_url: String,
    pub token: String,
    pub days: u32,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl DashboardConfig {
    pub fn new(api_base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            days: 7,
            poll_interval: Duration::from_secs(60),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(
            env::var("FOCUSWAVE_API_URL").unwrap_or_else(|_| "http://localhost:5000/api".into()),
            env::var("FOCUSWAVE_TOKEN").context("FOCUSWAVE_TOKEN must be set")?,
        );
        if let Some(days) = env::var("DASHBOARD_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            config.days = days.clamp(1, MAX_WINDOW_DAYS);
        }
        if let Some(secs) = env::var("DASHBOARD_POLL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.poll_interval = Duration::from_secs(secs.max(1));
        }
        Ok(config)
    }
}

pub struct HttpAnalyticsSource {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpAnalyticsSource {
    pub fn new(config: &DashboardConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            token: config.token.clone(),
        })
    }
}

impl AnalyticsSource for HttpAnalyticsSource {
    async fn fetch(&self, metric: Metric, days: u32) -> Result<Vec<Value>, SourceError> {
        let response = self
            .http
            .get(format!("{}/analytics/{}", self.base_url, metric.path()))
            .query(&[("days", days)])
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }

        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            SourceError::Decode(format!("invalid JSON for {}: {}", metric.path(), e))
        })?;

        match value {
            Value::Array(records) => Ok(records),
            other => Err(SourceError::Decode(format!(
                "expected a JSON array for {}, got {}",
                metric.path(),
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
