//! Monitor tuning.

use std::collections::BTreeMap;
use std::time::Duration;

use leadsbox_types::{Flow, LatencyThresholds, DEFAULT_WINDOW_SIZE};
use serde::{Deserialize, Serialize};

/// Thresholds and window sizes used when recording and judging flows.
///
/// The defaults are the production values; every field can be overridden
/// from a config file because the struct deserializes with `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Capacity of the recent duration and outcome rings.
    pub window_size: usize,
    /// Samples required before a metric may raise an alert.
    pub min_samples: usize,
    /// Minimum time between two alerts with the same flow, reason and severity.
    pub cooldown_secs: u64,
    /// Failure rate (0.0 - 1.0) at or above which a warning fires.
    pub error_rate_warning: f64,
    /// Failure rate (0.0 - 1.0) at or above which an error fires.
    pub error_rate_error: f64,
    /// Per-flow p95 latency thresholds. Flows missing here use their defaults.
    pub latency: BTreeMap<Flow, LatencyThresholds>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            min_samples: 8,
            cooldown_secs: 5 * 60,
            error_rate_warning: 0.15,
            error_rate_error: 0.30,
            latency: Flow::ALL
                .into_iter()
                .map(|flow| (flow, flow.default_latency_thresholds()))
                .collect(),
        }
    }
}

impl MonitorConfig {
    /// Latency thresholds for a flow.
    pub fn latency_thresholds(&self, flow: Flow) -> LatencyThresholds {
        self.latency
            .get(&flow)
            .copied()
            .unwrap_or_else(|| flow.default_latency_thresholds())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub(crate) fn cooldown_ms(&self) -> u64 {
        self.cooldown_secs.saturating_mul(1_000)
    }
}
