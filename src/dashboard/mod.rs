//! Client-side dashboard model.
//!
//! Fetches the three analytics series concurrently, tolerates any of them
//! failing, and reconciles whatever arrived into one chart-ready model that
//! always spans exactly `days` calendar days ending today.

mod reconcile;
mod source;
mod store;

pub use reconcile::{
    reconcile, CanonicalDay, DashboardModel, FocusDisplayPoint, MoodDisplayPoint,
    SourceOutcomes, TaskDisplayPoint, NO_MOOD_DATA,
};
pub use source::{AnalyticsSource, DashboardConfig, HttpAnalyticsSource, Metric, SourceError};
pub use store::{DashboardState, DashboardStore, SourceFailures};
