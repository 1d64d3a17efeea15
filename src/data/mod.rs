//! Data models and processing for flow snapshots.
//!
//! This module turns [`Snapshot`](leadsbox_monitor::Snapshot)s into rows and
//! issues ready for display.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of durations (e.g., "250ms", "1.5s")
//! - [`history`]: Per-flow history for sparklines and request rates
//! - [`dashboard`]: Core display models ([`DashboardData`], [`FlowRow`], [`FlowIssue`])
//!
//! ## Data Flow
//!
//! ```text
//! Snapshot (from a DataSource)
//!        │
//!        ▼
//! DashboardData::from_snapshot()
//!        │
//!        ├──▶ FlowRow (with thresholds and issues from MonitorConfig)
//!        │
//!        └──▶ History::record() (for sparklines)
//! ```

pub mod dashboard;
pub mod duration;
pub mod history;

pub use dashboard::{DashboardData, FlowIssue, FlowRow};
pub use history::History;
pub use leadsbox_monitor::HealthStatus;
