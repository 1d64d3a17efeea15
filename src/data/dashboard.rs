//! Flow rows and issues computed from snapshots.
//!
//! A row carries the snapshot view of one flow together with the thresholds
//! it is judged against, so the UI never needs the config directly.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use leadsbox_monitor::{
    error_rate_severity, latency_severity, summarize, AlertReason, Flow, FlowSnapshot,
    HealthStatus, LatencyThresholds, MonitorConfig, MonitoringState, Severity, Snapshot,
};

/// One flow, ready for display.
#[derive(Debug, Clone)]
pub struct FlowRow {
    pub flow: Flow,
    pub view: FlowSnapshot,
    pub thresholds: LatencyThresholds,
    pub issues: Vec<FlowIssue>,
}

impl FlowRow {
    pub fn health(&self) -> HealthStatus {
        self.view.health
    }

    fn new(flow: Flow, view: FlowSnapshot, config: &MonitorConfig) -> Self {
        let thresholds = config.latency_thresholds(flow);
        let issues = FlowIssue::detect(flow, &view, thresholds, config);
        Self {
            flow,
            view,
            thresholds,
            issues,
        }
    }
}

/// A threshold a flow is currently breaching.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowIssue {
    pub flow: Flow,
    pub reason: AlertReason,
    pub severity: Severity,
    /// Observed value, formatted for display.
    pub observed: String,
    /// Breached limit, formatted for display.
    pub limit: String,
}

impl FlowIssue {
    /// Issues for one flow, judged the same way the monitor judges alerts.
    ///
    /// Cooldowns are ignored: an issue is listed for as long as it persists.
    pub fn detect(
        flow: Flow,
        view: &FlowSnapshot,
        thresholds: LatencyThresholds,
        config: &MonitorConfig,
    ) -> Vec<FlowIssue> {
        if view.samples < config.min_samples {
            return Vec::new();
        }

        let mut issues = Vec::new();

        if let Some(p95) = view.p95_duration_ms {
            if let Some(severity) = latency_severity(p95, thresholds) {
                let limit = match severity {
                    Severity::Error => thresholds.error_ms,
                    Severity::Warning => thresholds.warning_ms,
                };
                issues.push(FlowIssue {
                    flow,
                    reason: AlertReason::Latency,
                    severity,
                    observed: format!("p95 {}ms", p95),
                    limit: format!("> {}ms", limit),
                });
            }
        }

        if let Some(severity) = error_rate_severity(view.failure_rate, config) {
            let limit = match severity {
                Severity::Error => config.error_rate_error,
                Severity::Warning => config.error_rate_warning,
            };
            issues.push(FlowIssue {
                flow,
                reason: AlertReason::ErrorRate,
                severity,
                observed: format!("{:.0}% failed", view.failure_rate * 100.0),
                limit: format!(">= {:.0}%", limit * 100.0),
            });
        }

        issues
    }
}

/// Complete processed data ready for display.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub flows: Vec<FlowRow>,
    /// When the snapshot was taken (unix ms).
    pub timestamp_ms: u64,
    /// When this process received it.
    pub last_updated: Instant,
}

impl DashboardData {
    /// Load a persisted monitoring state file and summarize it.
    pub fn load(path: &Path, config: &MonitorConfig) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, config)
    }

    /// Parse a monitoring state blob and summarize it.
    pub fn parse(content: &str, config: &MonitorConfig) -> Result<Self> {
        let mut state: MonitoringState = serde_json::from_str(content)?;
        state.normalize(config.window_size);
        let snapshot = summarize(&state, config, leadsbox_types::current_timestamp_ms());
        Ok(Self::from_snapshot(snapshot, config))
    }

    /// Convert a snapshot into display data.
    ///
    /// Rows keep the fixed flow order; the UI applies its own sorting.
    pub fn from_snapshot(snapshot: Snapshot, config: &MonitorConfig) -> Self {
        let timestamp_ms = snapshot.timestamp_ms;
        let flows = snapshot
            .flows
            .into_iter()
            .map(|(flow, view)| FlowRow::new(flow, view, config))
            .collect();

        Self {
            flows,
            timestamp_ms,
            last_updated: Instant::now(),
        }
    }

    pub fn row(&self, flow: Flow) -> Option<&FlowRow> {
        self.flows.iter().find(|row| row.flow == flow)
    }

    /// All current issues, errors first.
    pub fn issues(&self) -> Vec<&FlowIssue> {
        let mut issues: Vec<&FlowIssue> = self.flows.iter().flat_map(|row| &row.issues).collect();
        issues.sort_by(|a, b| b.severity.cmp(&a.severity));
        issues
    }

    pub fn total_requests(&self) -> u64 {
        self.flows.iter().map(|row| row.view.total).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.flows.iter().map(|row| row.view.failure).sum()
    }

    /// Number of flows in each health state: (healthy, warning, error).
    pub fn health_counts(&self) -> (usize, usize, usize) {
        self.flows
            .iter()
            .fold((0, 0, 0), |(ok, warn, err), row| match row.health() {
                HealthStatus::Healthy => (ok + 1, warn, err),
                HealthStatus::Warning => (ok, warn + 1, err),
                HealthStatus::Error => (ok, warn, err + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_json() -> &'static str {
        r#"{
            "flows": {
                "inbox_send": {
                    "total": 10, "success": 6, "failure": 4,
                    "recentDurations": [100, 100, 100, 100, 100, 100, 100, 100, 100, 6000],
                    "recentOutcomes": [0, 0, 0, 0, 0, 0, 1, 1, 1, 1],
                    "lastStatus": 500,
                    "lastUpdatedAt": 1700000000000
                }
            },
            "alertCooldowns": {}
        }"#
    }

    #[test]
    fn test_parse_state_blob() {
        let data = DashboardData::parse(state_json(), &MonitorConfig::default()).unwrap();

        assert_eq!(data.flows.len(), 3);
        assert_eq!(data.total_requests(), 10);
        assert_eq!(data.total_failures(), 4);

        let inbox = data.row(Flow::InboxSend).unwrap();
        assert_eq!(inbox.health(), HealthStatus::Error);
        assert_eq!(inbox.issues.len(), 2);
        assert_eq!(inbox.issues[0].reason, AlertReason::Latency);
        assert_eq!(inbox.issues[1].observed, "40% failed");
        assert_eq!(data.health_counts(), (2, 0, 1));
    }

    #[test]
    fn test_no_issues_below_min_samples() {
        let mut view = FlowSnapshot {
            samples: 7,
            p95_duration_ms: Some(9_000),
            failure_rate: 1.0,
            ..FlowSnapshot::default()
        };
        let config = MonitorConfig::default();
        let thresholds = config.latency_thresholds(Flow::InboxSend);
        assert!(FlowIssue::detect(Flow::InboxSend, &view, thresholds, &config).is_empty());

        view.samples = 8;
        assert_eq!(
            FlowIssue::detect(Flow::InboxSend, &view, thresholds, &config).len(),
            2
        );
    }

    #[test]
    fn test_issues_sorted_errors_first() {
        let config = MonitorConfig::default();
        let mut snapshot = Snapshot::new();
        snapshot.flows.insert(
            Flow::InboxSend,
            FlowSnapshot {
                samples: 8,
                p95_duration_ms: Some(3_000),
                ..FlowSnapshot::default()
            },
        );
        snapshot.flows.insert(
            Flow::FollowupSchedule,
            FlowSnapshot {
                samples: 8,
                failure_rate: 0.5,
                ..FlowSnapshot::default()
            },
        );

        let data = DashboardData::from_snapshot(snapshot, &config);
        let issues = data.issues();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].flow, Flow::FollowupSchedule);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DashboardData::parse("not json", &MonitorConfig::default()).is_err());
    }
}
