//! # leadsbox-doctor
//!
//! A diagnostic TUI and library for LeadsBox API flow health.
//!
//! The doctor reads the monitoring state the client-side API monitor
//! persists (or replays a captured request log through a fresh
//! [`leadsbox_monitor::Monitor`]) and shows per-flow request counts, failure
//! rates, latency percentiles and the alerts those produce. It also prints
//! follow-up agendas built with [`leadsbox_tasks`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(judging) │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── FileSource | ChannelSource ◀── replay      │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation and the alert log
//! - **[`source`]**: The [`DataSource`] trait, a polling file source and a
//!   channel source fed by a live monitor
//! - **[`data`]**: Turns snapshots into [`DashboardData`] with threshold
//!   issues, and keeps [`History`] for sparklines
//! - **[`ui`]**: ratatui rendering of the summary, alerts and detail views
//! - **[`replay`]**: Feeds request logs through a monitor on a manual clock
//! - **[`agenda`]**: Follow-up rules to bucketed tasks, as text
//!
//! ## Usage
//!
//! ```bash
//! # Watch the state file the web client persists
//! leadsbox-doctor --file leadsbox.api-monitoring.json
//!
//! # Replay a captured request log, live or headless
//! leadsbox-doctor --replay requests.ndjson
//! leadsbox-doctor --replay requests.ndjson --headless
//!
//! # Follow-up agenda
//! leadsbox-doctor --tasks followups.json --at 2024-05-10T09:00:00Z
//! ```
//!
//! ### As a library with a live monitor
//!
//! ```
//! use leadsbox_doctor::{ui::Theme, App, ChannelSource};
//! use leadsbox_monitor::{Monitor, MonitorConfig, RequestOutcome};
//!
//! let monitor = Monitor::new();
//! let (feed, source) = ChannelSource::create("in-process");
//!
//! monitor.observe(&RequestOutcome::new("POST", "/api/threads/7/reply", 180, 201, true));
//! feed.publish_snapshot(monitor.snapshot());
//!
//! let mut app = App::with_theme(Box::new(source), MonitorConfig::default(), Theme::dark());
//! app.reload_data().unwrap();
//! assert_eq!(app.data.as_ref().unwrap().total_requests(), 1);
//! ```

pub mod agenda;
pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod export;
pub mod replay;
pub mod source;
pub mod ui;

pub use app::{App, View};
pub use config::DoctorConfig;
pub use data::{DashboardData, FlowIssue, FlowRow, HealthStatus, History};
pub use replay::{ReplayReport, Replayer};
pub use source::{ChannelSource, DataSource, FileSource, SnapshotFeed};
