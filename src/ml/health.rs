use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

use super::client::MlClient;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MlHealthStatus {
    pub connected: bool,
    pub last_check: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Last known reachability of the ML service. Owned by `AppState` through
/// the `MlClient`; starts out disconnected until the first probe.
#[derive(Clone, Default)]
pub struct MlHealthMonitor {
    status: Arc<RwLock<MlHealthStatus>>,
}

impl MlHealthMonitor {
    pub async fn snapshot(&self) -> MlHealthStatus {
        self.status.read().await.clone()
    }

    pub(super) async fn update(&self, status: MlHealthStatus) {
        let mut current = self.status.write().await;
        if current.connected != status.connected {
            tracing::info!(
                connected = status.connected,
                error = status.error.as_deref().unwrap_or(""),
                "ML service connectivity changed"
            );
        }
        *current = status;
    }
}

/// Probe the ML service immediately and then every `interval` until
/// `shutdown` flips to `true` or its sender is dropped.
pub fn spawn_health_monitor(
    client: MlClient,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let status = client.check_health().await;
                    tracing::debug!(connected = status.connected, "ML health probe");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("ML health monitor stopped");
    })
}
