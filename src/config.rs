use std::env;
use std::time::Duration;

use anyhow::Context;

use crate::services::analytics::MAX_WINDOW_DAYS;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,

    pub ml_service_url: String,
    pub ml_health_interval_secs: u64,
    pub ml_request_timeout_secs: u64,

    pub analytics_default_days: u32,
    pub analytics_max_days: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".into())
                .parse()
                .context("PORT must be a number")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,

            ml_service_url: env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".into())
                .trim_end_matches('/')
                .to_string(),
            ml_health_interval_secs: env::var("ML_HEALTH_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
            ml_request_timeout_secs: env::var("ML_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "8".into())
                .parse()
                .unwrap_or(8),

            analytics_default_days: env::var("ANALYTICS_DEFAULT_DAYS")
                .unwrap_or_else(|_| "7".into())
                .parse()
                .unwrap_or(7),
            analytics_max_days: env::var("ANALYTICS_MAX_DAYS")
                .unwrap_or_else(|_| "365".into())
                .parse()
                .unwrap_or(365),
        };
        config.validated()
    }

    /// Caps `analytics_max_days` at [`MAX_WINDOW_DAYS`] and requires the
    /// default window to fall inside `1..=analytics_max_days`.
    fn validated(mut self) -> anyhow::Result<Self> {
        if self.analytics_max_days == 0 {
            anyhow::bail!("ANALYTICS_MAX_DAYS must be at least 1");
        }
        if self.analytics_max_days > MAX_WINDOW_DAYS {
            tracing::warn!(
                requested = self.analytics_max_days,
                max = MAX_WINDOW_DAYS,
                "ANALYTICS_MAX_DAYS capped"
            );
            self.analytics_max_days = MAX_WINDOW_DAYS;
        }
        if !(1..=self.analytics_max_days).contains(&self.analytics_default_days) {
            anyhow::bail!(
                "ANALYTICS_DEFAULT_DAYS must be between 1 and {}, got {}",
                self.analytics_max_days,
                self.analytics_default_days
            );
        }
        Ok(self)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ml_health_interval(&self) -> Duration {
        Duration::from_secs(self.ml_health_interval_secs.max(1))
    }

    pub fn ml_request_timeout(&self) -> Duration {
        Duration::from_secs(self.ml_request_timeout_secs.max(1))
    }
}

#[cfg(test)]
impl Config {
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/focuswave_test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: vec![],
            jwt_secret: "test-secret".into(),
            ml_service_url: "http://127.0.0.1:9".into(),
            ml_health_interval_secs: 30,
            ml_request_timeout_secs: 1,
            analytics_default_days: 7,
            analytics_max_days: 365,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_days(default_days: u32, max_days: u32) -> Config {
        Config {
            analytics_default_days: default_days,
            analytics_max_days: max_days,
            ..Config::for_tests()
        }
    }

    #[test]
    fn test_default_days_must_be_positive() {
        assert!(with_days(0, 365).validated().is_err());
    }

    #[test]
    fn test_default_days_must_not_exceed_max() {
        assert!(with_days(400, 365).validated().is_err());
        assert!(with_days(365, 365).validated().is_ok());
    }

    #[test]
    fn test_zero_max_days_rejected() {
        assert!(with_days(1, 0).validated().is_err());
    }

    #[test]
    fn test_max_days_capped() {
        let config = with_days(7, u32::MAX).validated().unwrap();
        assert_eq!(config.analytics_max_days, MAX_WINDOW_DAYS);
        assert_eq!(config.analytics_default_days, 7);
    }
}
