//! Data source abstraction for receiving flow snapshots.
//!
//! The doctor either polls a persisted monitoring state file or receives
//! snapshots pushed from an in-process [`leadsbox_monitor::Monitor`]
//! (request log replay).

mod channel;
mod file;

pub use channel::{ChannelSource, SnapshotFeed};
pub use file::FileSource;

use std::fmt::Debug;

use leadsbox_monitor::{Alert, Snapshot};

/// Trait for receiving flow snapshots from various sources.
///
/// # Example
///
/// ```
/// use leadsbox_doctor::{DataSource, FileSource};
/// use leadsbox_monitor::MonitorConfig;
///
/// let mut source = FileSource::new("leadsbox.api-monitoring.json", MonitorConfig::default());
/// if let Some(snapshot) = source.poll() {
///     println!("{} requests recorded", snapshot.total_requests());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest snapshot.
    ///
    /// Returns `Some(snapshot)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Snapshot>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message if an error occurred during the last poll.
    fn error(&self) -> Option<&str>;

    /// Alerts fired since the last call.
    ///
    /// Only live sources see alerts; a state file records cooldown stamps,
    /// not the alerts themselves.
    fn drain_alerts(&mut self) -> Vec<Alert> {
        Vec::new()
    }
}
