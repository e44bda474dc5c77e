use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use serde_json::Value;

use super::fallback::{default_payload, FallbackCounters};
use super::health::{MlHealthMonitor, MlHealthStatus};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);
const MOOD_SUGGESTIONS_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MlEndpoint {
    RecommendPomodoro,
    Sentiment,
    Coach,
    DistractionPredict,
    MoodSuggestions,
}

impl MlEndpoint {
    pub const COUNT: usize = 5;

    pub const ALL: [MlEndpoint; Self::COUNT] = [
        MlEndpoint::RecommendPomodoro,
        MlEndpoint::Sentiment,
        MlEndpoint::Coach,
        MlEndpoint::DistractionPredict,
        MlEndpoint::MoodSuggestions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MlEndpoint::RecommendPomodoro => "recommend-pomodoro",
            MlEndpoint::Sentiment => "sentiment",
            MlEndpoint::Coach => "coach",
            MlEndpoint::DistractionPredict => "distraction-predict",
            MlEndpoint::MoodSuggestions => "mood-suggestions",
        }
    }

    pub(super) fn index(&self) -> usize {
        *self as usize
    }

    fn timeout_override(&self) -> Option<Duration> {
        match self {
            MlEndpoint::MoodSuggestions => Some(MOOD_SUGGESTIONS_TIMEOUT),
            _ => None,
        }
    }

    pub fn fallback(&self) -> Value {
        default_payload(*self)
    }
}

/// Handle to the ML service. Cheap to clone; the health monitor and the
/// fallback counters are shared between clones.
#[derive(Clone)]
pub struct MlClient {
    http: reqwest::Client,
    base_url: String,
    health: MlHealthMonitor,
    fallbacks: Arc<FallbackCounters>,
}

impl MlClient {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build ML HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            health: MlHealthMonitor::default(),
            fallbacks: Arc::new(FallbackCounters::default()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health(&self) -> &MlHealthMonitor {
        &self.health
    }

    pub fn fallbacks(&self) -> &FallbackCounters {
        &self.fallbacks
    }

    /// Probe `GET /health` and record the outcome on the shared monitor.
    pub async fn check_health(&self) -> MlHealthStatus {
        let result = self
            .http
            .get(format!("{}/health", self.base_url))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await;

        let status = match result {
            Ok(resp) if resp.status().is_success() => MlHealthStatus {
                connected: true,
                last_check: Some(Utc::now()),
                error: None,
            },
            Ok(resp) => MlHealthStatus {
                connected: false,
                last_check: Some(Utc::now()),
                error: Some(format!("ML service returned {}", resp.status())),
            },
            Err(e) => MlHealthStatus {
                connected: false,
                last_check: Some(Utc::now()),
                error: Some(e.to_string()),
            },
        };

        self.health.update(status.clone()).await;
        status
    }

    pub async fn forward(&self, endpoint: MlEndpoint, body: &Value) -> anyhow::Result<Value> {
        let mut request = self
            .http
            .post(format!("{}/ml/{}", self.base_url, endpoint.as_str()))
            .json(body);
        if let Some(timeout) = endpoint.timeout_override() {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("ML service error {}: {}", status, body);
        }

        Ok(response.json::<Value>().await?)
    }

    /// Forward to the ML service, substituting the endpoint's default payload
    /// on any failure.
    pub async fn forward_or_fallback(&self, endpoint: MlEndpoint, body: &Value) -> Value {
        match self.forward(endpoint, body).await {
            Ok(data) => data,
            Err(e) => {
                let total = self.fallbacks.record(endpoint);
                tracing::warn!(
                    endpoint = endpoint.as_str(),
                    error = %e,
                    fallback_total = total,
                    "ML service unavailable, serving default response"
                );
                endpoint.fallback()
            }
        }
    }
}
