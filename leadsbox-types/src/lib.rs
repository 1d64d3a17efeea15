//! # leadsbox-types
//!
//! Shared types for monitoring the health of LeadsBox API flows. This crate
//! defines the vocabulary used by the monitor, the persisted state blob, and
//! the snapshot consumed by dashboards such as `leadsbox-doctor`.
//!
//! ## Features
//!
//! - `serde`: JSON serialization of the persisted state, alerts and snapshots
//!
//! ## Example
//!
//! ```rust
//! use leadsbox_types::{Flow, FlowSnapshot, HealthStatus, Snapshot};
//!
//! let snapshot = Snapshot::builder()
//!     .timestamp_ms(1_715_000_000_000)
//!     .flow(Flow::InboxSend, FlowSnapshot {
//!         total: 10,
//!         success: 9,
//!         failure: 1,
//!         failure_rate: 0.1,
//!         ..Default::default()
//!     })
//!     .build();
//!
//! assert_eq!(snapshot.total_requests(), 10);
//! assert_eq!(snapshot.worst_health(), HealthStatus::Healthy);
//! ```

mod alert;
mod flow;
mod outcome;
mod snapshot;
mod state;

pub use alert::*;
pub use flow::*;
pub use outcome::*;
pub use snapshot::*;
pub use state::*;

/// Current snapshot schema version.
///
/// The persisted monitoring blob is deliberately unversioned; readers reset
/// it to defaults when it cannot be decoded.
pub const SCHEMA_VERSION: u32 = 1;
