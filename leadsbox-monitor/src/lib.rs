//! # leadsbox-monitor
//!
//! Passive health monitoring for LeadsBox API flows.
//!
//! The monitor is fed the outcome of every REST call made by the client.
//! Calls that classify into a known [`Flow`] are recorded into rolling
//! windows; when the p95 latency or the failure rate of a flow degrades, an
//! advisory [`Alert`] is delivered to every subscribed listener, rate-limited
//! by a per-alert cooldown. Monitoring never fails the request it observes.
//!
//! ## Quick Start
//!
//! ```rust
//! use leadsbox_monitor::{Monitor, RequestOutcome};
//!
//! let monitor = Monitor::new();
//!
//! let subscription = monitor.subscribe(|alert| {
//!     eprintln!("{}: {}", alert.title, alert.description);
//! });
//!
//! // Report a completed request from your HTTP client wrapper
//! monitor.observe(&RequestOutcome::new("POST", "/api/threads/42/reply", 180, 201, true));
//!
//! let snapshot = monitor.snapshot();
//! assert_eq!(snapshot.total_requests(), 1);
//!
//! subscription.unsubscribe();
//! ```
//!
//! ## Features
//!
//! - **Pluggable storage**: state lives behind a [`KeyValueStore`]
//!   ([`MemoryStore`], [`FileStore`], or your own)
//! - **Deterministic time**: inject a [`Clock`] such as [`ManualClock`] in tests
//! - **Best effort**: unreadable state resets to zero, write failures are logged

mod alerting;
mod classify;
mod clock;
mod config;
mod listeners;
mod monitor;
mod state;
mod stats;
mod store;
mod summary;
mod timer;

pub use alerting::{error_rate_severity, latency_severity};
pub use classify::classify;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MonitorConfig;
pub use listeners::Subscription;
pub use monitor::{Monitor, MonitorBuilder, STATE_KEY};
pub use stats::{mean, p95, percentile};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use summary::summarize;
pub use timer::RequestTimer;

// Re-export types for convenience
pub use leadsbox_types::{
    Alert, AlertReason, Flow, FlowMetric, FlowSnapshot, HealthStatus, LatencyThresholds,
    MonitoringState, RequestOutcome, Severity, Snapshot,
};
