use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::reconcile::{reconcile, DashboardModel, SourceOutcomes};
use super::source::{AnalyticsSource, DashboardConfig, HttpAnalyticsSource, Metric};
use crate::services::analytics::MAX_WINDOW_DAYS;

/// How many refreshes each source failed in, plus how many failed entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceFailures {
    pub focus: u64,
    pub tasks: u64,
    pub mood: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    /// Sequence number of the refresh the model came from. 0 until the
    /// first one lands.
    pub version: u64,
    pub loading: bool,
    pub model: DashboardModel,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub failures: SourceFailures,
}

impl DashboardState {
    fn initial(today: NaiveDate, days: u32) -> Self {
        Self {
            version: 0,
            loading: true,
            model: DashboardModel::fallback(today, days),
            refreshed_at: None,
            failures: SourceFailures::default(),
        }
    }
}

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

type InflightRefresh = Shared<BoxFuture<'static, u64>>;

struct Inner<S> {
    source: S,
    days: u32,
    poll_interval: Duration,
    state: watch::Sender<DashboardState>,
    next_seq: AtomicU64,
    inflight: Mutex<Option<InflightRefresh>>,
}

/// Owns the dashboard model and publishes every change on a `watch` channel.
///
/// At most one refresh runs at a time; callers that trigger one while
/// another is in flight wait for that one instead of issuing new fetches.
pub struct DashboardStore<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for DashboardStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl DashboardStore<HttpAnalyticsSource> {
    /// Store backed by the REST API described by `config`.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_config(HttpAnalyticsSource::new(config)?, config))
    }
}

impl<S: AnalyticsSource> DashboardStore<S> {
    /// Store over `days` days that polls at the default interval.
    pub fn new(source: S, days: u32) -> Self {
        Self::build(source, days, DEFAULT_POLL_INTERVAL)
    }

    /// Store taking its window and poll interval from `config`.
    pub fn with_config(source: S, config: &DashboardConfig) -> Self {
        Self::build(source, config.days, config.poll_interval)
    }

    fn build(source: S, days: u32, poll_interval: Duration) -> Self {
        let days = days.clamp(1, MAX_WINDOW_DAYS);
        let (state, _) = watch::channel(DashboardState::initial(Utc::now().date_naive(), days));
        Self {
            inner: Arc::new(Inner {
                source,
                days,
                poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
                state,
                next_seq: AtomicU64::new(0),
                inflight: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.inner.state.subscribe()
    }

    pub fn current(&self) -> DashboardState {
        self.inner.state.borrow().clone()
    }

    pub fn days(&self) -> u32 {
        self.inner.days
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    /// Fetch all three series and publish the reconciled model. Returns the
    /// sequence number of the refresh that served this call.
    pub async fn refresh(&self) -> u64 {
        let refresh = {
            let mut slot = lock(&self.inner.inflight);
            match slot.as_ref() {
                Some(running) => running.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let started = async move {
                        let seq = inner.run_refresh().await;
                        *lock(&inner.inflight) = None;
                        seq
                    }
                    .boxed()
                    .shared();
                    *slot = Some(started.clone());
                    started
                }
            }
        };
        refresh.await
    }

    /// Refresh immediately and then every poll interval until `shutdown`
    /// flips to `true` or its sender is dropped.
    pub fn spawn_poller(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(store.poll_interval());
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let version = store.refresh().await;
                        tracing::debug!(version, "Dashboard poll");
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Dashboard poller stopped");
        })
    }
}

impl<S: AnalyticsSource> Inner<S> {
    async fn run_refresh(&self) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_if_modified(|state| !std::mem::replace(&mut state.loading, true));

        let (focus, tasks, mood) = tokio::join!(
            self.source.fetch(Metric::FocusMinutes, self.days),
            self.source.fetch(Metric::TaskThroughput, self.days),
            self.source.fetch(Metric::MoodFocus, self.days),
        );

        let outcomes = SourceOutcomes { focus, tasks, mood };
        self.apply(seq, Utc::now().date_naive(), outcomes);
        seq
    }

    /// Publish the result of refresh `seq` unless a newer one already landed.
    fn apply(&self, seq: u64, today: NaiveDate, outcomes: SourceOutcomes) -> bool {
        let model = reconcile(today, self.days, &outcomes);

        self.state.send_if_modified(|state| {
            if seq <= state.version {
                tracing::debug!(seq, applied = state.version, "Dropping stale dashboard refresh");
                return false;
            }

            let sources = [
                (Metric::FocusMinutes, &outcomes.focus, &mut state.failures.focus),
                (Metric::TaskThroughput, &outcomes.tasks, &mut state.failures.tasks),
                (Metric::MoodFocus, &outcomes.mood, &mut state.failures.mood),
            ];
            for (metric, outcome, counter) in sources {
                if let Err(err) = outcome {
                    *counter += 1;
                    tracing::warn!(
                        metric = metric.path(),
                        error = %err,
                        failures = *counter,
                        "Analytics source failed, showing defaults"
                    );
                }
            }
            if outcomes.all_failed() {
                state.failures.total += 1;
                tracing::warn!(
                    seq,
                    failures = state.failures.total,
                    "All analytics sources failed, showing empty dashboard"
                );
            }

            state.version = seq;
            state.loading = false;
            state.model = model;
            state.refreshed_at = Some(Utc::now());
            true
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
