//! Persisted monitoring state.
//!
//! This is the blob the monitor reads and writes in full on every recorded
//! request. Field names follow the camelCase layout the browser client
//! persisted, so existing blobs stay readable.

use std::collections::{BTreeMap, VecDeque};

use crate::Flow;

/// Default number of samples kept in each recent-sample ring.
pub const DEFAULT_WINDOW_SIZE: usize = 40;

/// Accumulated outcomes for a single flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct FlowMetric {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    /// Recent request durations in milliseconds, oldest first.
    pub recent_durations: VecDeque<u64>,
    /// Recent outcomes, oldest first: 0 for success, 1 for failure.
    pub recent_outcomes: VecDeque<u8>,
    pub last_status: Option<u16>,
    /// Unix timestamp in milliseconds of the last recorded request.
    pub last_updated_at: Option<u64>,
}

impl FlowMetric {
    /// Record one request, evicting the oldest samples beyond `window`.
    pub fn record(&mut self, duration_ms: u64, status: u16, ok: bool, at_ms: u64, window: usize) {
        self.total += 1;
        if ok {
            self.success += 1;
        } else {
            self.failure += 1;
        }

        self.recent_durations.push_back(duration_ms);
        self.recent_outcomes.push_back(if ok { 0 } else { 1 });
        self.trim(window);

        self.last_status = Some(status);
        self.last_updated_at = Some(at_ms);
    }

    /// Drop the oldest samples until both rings fit in `window`.
    pub fn trim(&mut self, window: usize) {
        while self.recent_durations.len() > window {
            self.recent_durations.pop_front();
        }
        while self.recent_outcomes.len() > window {
            self.recent_outcomes.pop_front();
        }
    }

    /// Check whether anything has been recorded for this flow.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Everything the monitor persists between sessions.
///
/// Invariant: `flows` holds exactly one entry per [`Flow`]. Construct with
/// [`MonitoringState::new`] and call [`MonitoringState::normalize`] after
/// decoding a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MonitoringState {
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "deserialize_known_flows")
    )]
    pub flows: BTreeMap<Flow, FlowMetric>,

    /// Last firing time (unix ms) per `flow:reason:severity` key.
    #[cfg_attr(feature = "serde", serde(default))]
    pub alert_cooldowns: BTreeMap<String, u64>,
}

impl MonitoringState {
    /// A fresh state with every flow zeroed and no cooldowns.
    pub fn new() -> Self {
        Self {
            flows: Flow::ALL
                .into_iter()
                .map(|flow| (flow, FlowMetric::default()))
                .collect(),
            alert_cooldowns: BTreeMap::new(),
        }
    }

    /// Restore the one-metric-per-flow invariant and clamp ring sizes.
    pub fn normalize(&mut self, window: usize) {
        for flow in Flow::ALL {
            self.flows.entry(flow).or_default().trim(window);
        }
    }

    /// Metrics for a flow.
    pub fn metric(&self, flow: Flow) -> Option<&FlowMetric> {
        self.flows.get(&flow)
    }

    /// Mutable metrics for a flow, inserting a zeroed entry if absent.
    pub fn metric_mut(&mut self, flow: Flow) -> &mut FlowMetric {
        self.flows.entry(flow).or_default()
    }

    /// Total requests recorded across all flows.
    pub fn total_requests(&self) -> u64 {
        self.flows.values().map(|m| m.total).sum()
    }
}

impl Default for MonitoringState {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the flow map, silently dropping flows this build does not know.
#[cfg(feature = "serde")]
fn deserialize_known_flows<'de, D>(deserializer: D) -> Result<BTreeMap<Flow, FlowMetric>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let raw = BTreeMap::<String, FlowMetric>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, metric)| key.parse::<Flow>().ok().map(|flow| (flow, metric)))
        .collect())
}
