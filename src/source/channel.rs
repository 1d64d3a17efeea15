//! Channel-based data source.
//!
//! Receives snapshots via a tokio watch channel and alerts via an unbounded
//! mpsc channel. Used when the doctor drives a monitor in-process.

use tokio::sync::{mpsc, watch};

use leadsbox_monitor::{Alert, Snapshot};

use super::DataSource;

/// Producer half of a [`ChannelSource`].
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    snapshots: watch::Sender<Snapshot>,
    alerts: mpsc::UnboundedSender<Alert>,
}

impl SnapshotFeed {
    /// Publish the latest snapshot. Returns false once the source is gone.
    pub fn publish_snapshot(&self, snapshot: Snapshot) -> bool {
        self.snapshots.send(snapshot).is_ok()
    }

    /// Forward a fired alert. Returns false once the source is gone.
    pub fn publish_alert(&self, alert: Alert) -> bool {
        self.alerts.send(alert).is_ok()
    }
}

/// A data source fed through channels.
///
/// # Example
///
/// ```
/// use leadsbox_doctor::{ChannelSource, DataSource};
/// use leadsbox_monitor::Monitor;
///
/// let (feed, mut source) = ChannelSource::create("replay: requests.ndjson");
/// feed.publish_snapshot(Monitor::new().snapshot());
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    snapshots: watch::Receiver<Snapshot>,
    alerts: mpsc::UnboundedReceiver<Alert>,
    description: String,
    last_seen: Option<Snapshot>,
}

impl ChannelSource {
    /// Create a connected feed and source.
    pub fn create(source_description: &str) -> (SnapshotFeed, Self) {
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::new());
        let (alert_tx, alert_rx) = mpsc::unbounded_channel();
        let feed = SnapshotFeed {
            snapshots: snapshot_tx,
            alerts: alert_tx,
        };
        let source = Self {
            snapshots: snapshot_rx,
            alerts: alert_rx,
            description: format!("channel: {}", source_description),
            last_seen: None,
        };
        (feed, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Snapshot> {
        let fresh = match self.snapshots.has_changed() {
            Ok(changed) => changed || self.last_seen.is_none(),
            // Feed dropped; its final value may not have been seen yet
            Err(_) => self.last_seen.as_ref() != Some(&*self.snapshots.borrow()),
        };
        if !fresh {
            return None;
        }

        let snapshot = self.snapshots.borrow_and_update().clone();
        self.last_seen = Some(snapshot.clone());
        Some(snapshot)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }

    fn drain_alerts(&mut self) -> Vec<Alert> {
        let mut alerts = Vec::new();
        while let Ok(alert) = self.alerts.try_recv() {
            alerts.push(alert);
        }
        alerts
    }
}
