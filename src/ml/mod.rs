//! Proxy to the FocusWave ML microservice.
//!
//! The service is optional: every call degrades to a fixed default payload
//! when it is unreachable, slow, or answers with a non-2xx status. Each
//! degradation is logged and counted so the fallback rate stays visible.

mod client;
mod fallback;
mod health;

pub use client::{MlClient, MlEndpoint};
pub use fallback::FallbackCounters;
pub use health::{spawn_health_monitor, MlHealthMonitor, MlHealthStatus};
