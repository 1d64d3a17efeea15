//! Alert evaluation and cooldown bookkeeping.

use std::collections::BTreeMap;

use leadsbox_types::{
    Alert, AlertReason, Flow, FlowMetric, HealthStatus, LatencyThresholds, Severity,
};

use crate::config::MonitorConfig;
use crate::stats::{failure_rate, p95};

/// Severity of a p95 latency against a flow's thresholds.
pub fn latency_severity(p95_ms: u64, thresholds: LatencyThresholds) -> Option<Severity> {
    if p95_ms > thresholds.error_ms {
        Some(Severity::Error)
    } else if p95_ms > thresholds.warning_ms {
        Some(Severity::Warning)
    } else {
        None
    }
}

/// Severity of a failure rate against the configured thresholds.
pub fn error_rate_severity(rate: f64, config: &MonitorConfig) -> Option<Severity> {
    if rate >= config.error_rate_error {
        Some(Severity::Error)
    } else if rate >= config.error_rate_warning {
        Some(Severity::Warning)
    } else {
        None
    }
}

/// Alerts a flow's metrics call for, before cooldowns are applied.
///
/// Each metric is only judged once its window holds `min_samples` samples.
/// Latency comes before error rate in the result.
pub(crate) fn evaluate(flow: Flow, metric: &FlowMetric, config: &MonitorConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let durations = &metric.recent_durations;
    if durations.len() >= config.min_samples {
        let thresholds = config.latency_thresholds(flow);
        if let Some(p95_ms) = p95(durations.iter().copied()) {
            if let Some(severity) = latency_severity(p95_ms, thresholds) {
                alerts.push(latency_alert(flow, severity, p95_ms, durations.len(), thresholds));
            }
        }
    }

    let outcomes = &metric.recent_outcomes;
    if outcomes.len() >= config.min_samples {
        let rate = failure_rate(outcomes);
        if let Some(severity) = error_rate_severity(rate, config) {
            alerts.push(error_rate_alert(flow, severity, rate, outcomes.len()));
        }
    }

    alerts
}

/// Health verdict for a flow, ignoring cooldowns.
pub(crate) fn flow_health(flow: Flow, metric: &FlowMetric, config: &MonitorConfig) -> HealthStatus {
    let worst = evaluate(flow, metric, config)
        .into_iter()
        .map(|alert| alert.severity)
        .max();
    HealthStatus::from(worst)
}

/// Drop alerts still inside their cooldown and stamp the ones that fire.
pub(crate) fn apply_cooldowns(
    cooldowns: &mut BTreeMap<String, u64>,
    candidates: Vec<Alert>,
    now_ms: u64,
    cooldown_ms: u64,
) -> Vec<Alert> {
    candidates
        .into_iter()
        .filter(|alert| {
            let key = alert.cooldown_key();
            let cooling = cooldowns
                .get(&key)
                .is_some_and(|&last| now_ms.saturating_sub(last) < cooldown_ms);
            if !cooling {
                cooldowns.insert(key, now_ms);
            }
            !cooling
        })
        .collect()
}

fn latency_alert(
    flow: Flow,
    severity: Severity,
    p95_ms: u64,
    samples: usize,
    thresholds: LatencyThresholds,
) -> Alert {
    let (title, limit) = match severity {
        Severity::Error => (format!("{} is very slow", flow.label()), thresholds.error_ms),
        Severity::Warning => (format!("{} is slow", flow.label()), thresholds.warning_ms),
    };
    Alert {
        flow,
        reason: AlertReason::Latency,
        severity,
        title,
        description: format!(
            "p95 latency is {p95_ms}ms over the last {samples} requests (limit {limit}ms)."
        ),
    }
}

fn error_rate_alert(flow: Flow, severity: Severity, rate: f64, samples: usize) -> Alert {
    let title = match severity {
        Severity::Error => format!("{} is failing", flow.label()),
        Severity::Warning => format!("{} errors are rising", flow.label()),
    };
    Alert {
        flow,
        reason: AlertReason::ErrorRate,
        severity,
        title,
        description: format!(
            "{:.0}% of the last {samples} requests failed.",
            rate * 100.0
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadsbox_types::DEFAULT_WINDOW_SIZE;

    fn metric_with(durations: &[u64], failures: usize) -> FlowMetric {
        let mut metric = FlowMetric::default();
        for (i, &d) in durations.iter().enumerate() {
            metric.record(d, 200, i >= failures, i as u64, DEFAULT_WINDOW_SIZE);
        }
        metric
    }

    #[test]
    fn latency_thresholds_are_strict() {
        let t = LatencyThresholds::new(2_500, 5_000);
        assert_eq!(latency_severity(2_500, t), None);
        assert_eq!(latency_severity(2_501, t), Some(Severity::Warning));
        assert_eq!(latency_severity(5_000, t), Some(Severity::Warning));
        assert_eq!(latency_severity(5_001, t), Some(Severity::Error));
    }

    #[test]
    fn error_rate_thresholds_are_inclusive() {
        let config = MonitorConfig::default();
        assert_eq!(error_rate_severity(0.14, &config), None);
        assert_eq!(error_rate_severity(0.15, &config), Some(Severity::Warning));
        assert_eq!(error_rate_severity(0.30, &config), Some(Severity::Error));
    }

    #[test]
    fn nothing_fires_below_min_samples() {
        let config = MonitorConfig::default();
        let metric = metric_with(&[9_000; 7], 7);
        assert!(evaluate(Flow::InboxSend, &metric, &config).is_empty());
    }

    #[test]
    fn slow_and_failing_flow_raises_both() {
        let config = MonitorConfig::default();
        let metric = metric_with(&[100, 100, 100, 100, 100, 100, 100, 5_001], 4);

        let alerts = evaluate(Flow::InboxSend, &metric, &config);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].reason, AlertReason::Latency);
        assert_eq!(alerts[0].severity, Severity::Error);
        assert_eq!(alerts[1].reason, AlertReason::ErrorRate);
        assert_eq!(alerts[1].severity, Severity::Error);
        assert!(alerts[1].description.starts_with("50%"));
    }

    #[test]
    fn health_is_worst_severity() {
        let config = MonitorConfig::default();
        let metric = metric_with(&[3_000; 8], 0);
        assert_eq!(
            flow_health(Flow::InboxSend, &metric, &config),
            HealthStatus::Warning
        );
        assert_eq!(
            flow_health(Flow::InboxSend, &FlowMetric::default(), &config),
            HealthStatus::Healthy
        );
    }

    #[test]
    fn cooldown_suppresses_repeats() {
        let config = MonitorConfig::default();
        let metric = metric_with(&[3_000; 8], 0);
        let mut cooldowns = BTreeMap::new();

        let first = apply_cooldowns(
            &mut cooldowns,
            evaluate(Flow::InboxSend, &metric, &config),
            1_000,
            config.cooldown_ms(),
        );
        assert_eq!(first.len(), 1);

        let second = apply_cooldowns(
            &mut cooldowns,
            evaluate(Flow::InboxSend, &metric, &config),
            1_000 + config.cooldown_ms() - 1,
            config.cooldown_ms(),
        );
        assert!(second.is_empty());
        // Suppression does not extend the cooldown
        assert_eq!(cooldowns.get("inbox_send:latency:warning"), Some(&1_000));

        let third = apply_cooldowns(
            &mut cooldowns,
            evaluate(Flow::InboxSend, &metric, &config),
            1_000 + config.cooldown_ms(),
            config.cooldown_ms(),
        );
        assert_eq!(third.len(), 1);
    }
}
