//! Snapshot - a point-in-time view of flow health.

use std::collections::BTreeMap;

use crate::{Flow, Severity, SCHEMA_VERSION};

/// Health of a flow as judged against its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HealthStatus {
    #[default]
    Healthy,
    Warning,
    Error,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Error => "ERR",
        }
    }
}

impl From<Option<Severity>> for HealthStatus {
    fn from(severity: Option<Severity>) -> Self {
        match severity {
            None => HealthStatus::Healthy,
            Some(Severity::Warning) => HealthStatus::Warning,
            Some(Severity::Error) => HealthStatus::Error,
        }
    }
}

/// Derived per-flow view computed from the persisted metrics.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FlowSnapshot {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    /// Mean of the recent outcome window (0.0 - 1.0).
    pub failure_rate: f64,
    /// Rounded mean of recent durations, if any were recorded.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub avg_duration_ms: Option<u64>,
    /// p95 of recent durations, if any were recorded.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub p95_duration_ms: Option<u64>,
    /// Number of samples currently in the duration window.
    pub samples: usize,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub last_status: Option<u16>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub last_updated_at: Option<u64>,
    /// Worst of the latency and error-rate verdicts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub health: HealthStatus,
}

/// Schema version embedded in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub const fn current() -> Self {
        Self {
            major: SCHEMA_VERSION,
            minor: 0,
        }
    }

    /// Same major version as this library.
    pub fn is_compatible(&self) -> bool {
        self.major == SCHEMA_VERSION
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::current()
    }
}

/// A point-in-time snapshot of every monitored flow.
///
/// # Example
///
/// ```rust
/// use leadsbox_types::{Flow, FlowSnapshot, Snapshot};
///
/// let snapshot = Snapshot::builder()
///     .flow(Flow::InboxSend, FlowSnapshot { total: 4, success: 4, ..Default::default() })
///     .build();
///
/// assert_eq!(snapshot.get(Flow::InboxSend).unwrap().total, 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Snapshot {
    pub version: SchemaVersion,
    /// Unix timestamp in milliseconds when this snapshot was taken.
    pub timestamp_ms: u64,
    pub flows: BTreeMap<Flow, FlowSnapshot>,
}

impl Snapshot {
    /// Create an empty snapshot with the current timestamp.
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_ms())
    }

    pub fn with_timestamp(timestamp_ms: u64) -> Self {
        Self {
            version: SchemaVersion::current(),
            timestamp_ms,
            flows: BTreeMap::new(),
        }
    }

    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn get(&self, flow: Flow) -> Option<&FlowSnapshot> {
        self.flows.get(&flow)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Flow, &FlowSnapshot)> {
        self.flows.iter()
    }

    /// Total requests across all flows.
    pub fn total_requests(&self) -> u64 {
        self.flows.values().map(|f| f.total).sum()
    }

    /// Total failed requests across all flows.
    pub fn total_failures(&self) -> u64 {
        self.flows.values().map(|f| f.failure).sum()
    }

    /// The worst health of any flow.
    pub fn worst_health(&self) -> HealthStatus {
        self.flows
            .values()
            .map(|f| f.health)
            .max()
            .unwrap_or_default()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    timestamp_ms: Option<u64>,
    flows: BTreeMap<Flow, FlowSnapshot>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    pub fn flow(mut self, flow: Flow, view: FlowSnapshot) -> Self {
        self.flows.insert(flow, view);
        self
    }

    pub fn build(self) -> Snapshot {
        Snapshot {
            version: SchemaVersion::current(),
            timestamp_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            flows: self.flows,
        }
    }
}

/// Current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
