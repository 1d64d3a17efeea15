//! Snapshot computation from persisted state.

use leadsbox_types::{Flow, FlowMetric, FlowSnapshot, MonitoringState, Snapshot};

use crate::alerting::flow_health;
use crate::config::MonitorConfig;
use crate::stats::{failure_rate, mean, p95};

/// Compute the per-flow view of a monitoring state.
///
/// Pure: the state is not modified and no cooldowns are consulted. Every
/// known flow appears in the result, recorded or not.
pub fn summarize(state: &MonitoringState, config: &MonitorConfig, timestamp_ms: u64) -> Snapshot {
    let empty = FlowMetric::default();

    Flow::ALL
        .into_iter()
        .fold(Snapshot::builder().timestamp_ms(timestamp_ms), |builder, flow| {
            let metric = state.metric(flow).unwrap_or(&empty);
            builder.flow(flow, summarize_flow(flow, metric, config))
        })
        .build()
}

fn summarize_flow(flow: Flow, metric: &FlowMetric, config: &MonitorConfig) -> FlowSnapshot {
    let durations = &metric.recent_durations;

    FlowSnapshot {
        total: metric.total,
        success: metric.success,
        failure: metric.failure,
        failure_rate: failure_rate(&metric.recent_outcomes),
        avg_duration_ms: mean(durations.iter().map(|&d| d as f64)).map(|m| m.round() as u64),
        p95_duration_ms: p95(durations.iter().copied()),
        samples: durations.len(),
        last_status: metric.last_status,
        last_updated_at: metric.last_updated_at,
        health: flow_health(flow, metric, config),
    }
}
