//! Summary view rendering.
//!
//! Displays a table of all flows with request counts, failure rate,
//! latency against thresholds, and sparkline trends.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};


use crate::app::App;
use crate::data::duration::format_opt_ms;
use crate::data::{DashboardData, FlowRow, HealthStatus};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column to sort by in the Summary view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Fixed flow order.
    #[default]
    Flow,
    Requests,
    FailureRate,
    P95,
    Status,
}

impl SortColumn {
    pub fn next(self) -> Self {
        match self {
            SortColumn::Flow => SortColumn::Requests,
            SortColumn::Requests => SortColumn::FailureRate,
            SortColumn::FailureRate => SortColumn::P95,
            SortColumn::P95 => SortColumn::Status,
            SortColumn::Status => SortColumn::Flow,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortColumn::Flow => "flow",
            SortColumn::Requests => "requests",
            SortColumn::FailureRate => "failures",
            SortColumn::P95 => "p95",
            SortColumn::Status => "status",
        }
    }
}

/// Rows in display order. Ties fall back to the fixed flow order.
pub fn sorted_rows(data: &DashboardData, column: SortColumn, ascending: bool) -> Vec<&FlowRow> {
    let mut rows: Vec<&FlowRow> = data.flows.iter().collect();
    rows.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Flow => a.flow.cmp(&b.flow),
            SortColumn::Requests => a.view.total.cmp(&b.view.total),
            SortColumn::FailureRate => a
                .view
                .failure_rate
                .partial_cmp(&b.view.failure_rate)
                .unwrap_or(Ordering::Equal),
            SortColumn::P95 => a.view.p95_duration_ms.cmp(&b.view.p95_duration_ms),
            SortColumn::Status => a.health().cmp(&b.health()),
        };
        let primary = if ascending { primary } else { primary.reverse() };
        primary.then_with(|| a.flow.cmp(&b.flow))
    });
    rows
}

/// Render the Summary view showing all flows in a sortable table.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref data) = app.data else {
        return;
    };

    let rows = sorted_rows(data, app.sort_column, app.sort_ascending);

    let header = Row::new(vec![
        Cell::from(format_header("Flow", SortColumn::Flow, app)),
        Cell::from(format_header("Requests", SortColumn::Requests, app)),
        Cell::from("Rate"),
        Cell::from(format_header("Failed", SortColumn::FailureRate, app)),
        Cell::from("Avg"),
        Cell::from(format_header("p95", SortColumn::P95, app)),
        Cell::from("Limit"),
        Cell::from("Trend"),
        Cell::from("Last"),
        Cell::from(format_header("Status", SortColumn::Status, app)),
    ])
    .height(1)
    .style(app.theme.header());

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let view = &row.view;

            let p95_style = app.theme.latency_style(view.p95_duration_ms, row.thresholds);
            let failure_style =
                app.theme
                    .failure_rate_style(view.failure_rate, view.samples, &app.config);

            let rate = app
                .history
                .request_rate(row.flow)
                .map(|r| format!("{:.1}/s", r))
                .unwrap_or_else(|| "-".to_string());

            let status_label = if view.samples < app.config.min_samples && view.total > 0 {
                format!("{} ({}/{})", row.health().symbol(), view.samples, app.config.min_samples)
            } else {
                row.health().symbol().to_string()
            };

            Row::new(vec![
                Cell::from(row.flow.label()),
                Cell::from(format_count(view.total)),
                Cell::from(rate),
                Cell::from(if view.total > 0 {
                    format!("{:.0}%", view.failure_rate * 100.0)
                } else {
                    "-".to_string()
                })
                .style(failure_style),
                Cell::from(format_opt_ms(view.avg_duration_ms)),
                Cell::from(format_opt_ms(view.p95_duration_ms)).style(p95_style),
                Cell::from(format!(
                    "{}/{}",
                    row.thresholds.warning_ms, row.thresholds.error_ms
                )),
                Cell::from(render_sparkline(&app.history.p95_sparkline(row.flow))),
                Cell::from(
                    view.last_status
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(status_label).style(app.theme.status_style(row.health())),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Flow
        Constraint::Fill(1), // Requests
        Constraint::Fill(1), // Rate
        Constraint::Fill(1), // Failed
        Constraint::Fill(1), // Avg
        Constraint::Fill(1), // p95
        Constraint::Min(11), // Limit
        Constraint::Min(8),  // Trend
        Constraint::Min(5),  // Last
        Constraint::Min(10), // Status
    ];

    let selected = app.selected_flow_index.min(rows.len().saturating_sub(1));
    let (ok, warn, err) = data.health_counts();
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let title = format!(
        " Flows ({} ok, {} warn, {} err) [s:sort {}{}] ",
        ok,
        warn,
        err,
        app.sort_column.label(),
        sort_dir,
    );

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(app.theme.border()),
        )
        .row_highlight_style(app.theme.selected())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

pub(crate) fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

/// Format large numbers with K/M suffixes
pub(crate) fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Health of the whole dashboard: the worst flow.
pub(crate) fn overall_health(data: &DashboardData) -> HealthStatus {
    data.flows
        .iter()
        .map(FlowRow::health)
        .max()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadsbox_monitor::{Flow, FlowSnapshot, MonitorConfig, Snapshot};

    fn data() -> DashboardData {
        let snapshot = Snapshot::builder()
            .flow(
                Flow::InboxSend,
                FlowSnapshot {
                    total: 40,
                    p95_duration_ms: Some(900),
                    ..FlowSnapshot::default()
                },
            )
            .flow(
                Flow::SalesQuickCapture,
                FlowSnapshot {
                    total: 2,
                    failure_rate: 0.5,
                    health: HealthStatus::Error,
                    ..FlowSnapshot::default()
                },
            )
            .flow(
                Flow::FollowupSchedule,
                FlowSnapshot {
                    total: 2,
                    p95_duration_ms: Some(4_000),
                    ..FlowSnapshot::default()
                },
            )
            .build();
        DashboardData::from_snapshot(snapshot, &MonitorConfig::default())
    }

    fn flows(rows: &[&FlowRow]) -> Vec<Flow> {
        rows.iter().map(|r| r.flow).collect()
    }

    #[test]
    fn sort_by_requests_breaks_ties_by_flow() {
        let data = data();
        assert_eq!(
            flows(&sorted_rows(&data, SortColumn::Requests, true)),
            [Flow::SalesQuickCapture, Flow::FollowupSchedule, Flow::InboxSend]
        );
    }

    #[test]
    fn sort_descending_puts_worst_first() {
        let data = data();
        assert_eq!(
            sorted_rows(&data, SortColumn::Status, false)[0].flow,
            Flow::SalesQuickCapture
        );
        assert_eq!(
            sorted_rows(&data, SortColumn::P95, false)[0].flow,
            Flow::FollowupSchedule
        );
        assert_eq!(overall_health(&data), HealthStatus::Error);
    }

    #[test]
    fn sparkline_keeps_last_eight() {
        assert_eq!(render_sparkline(&[]), "        ");
        assert_eq!(render_sparkline(&[0, 1, 2, 3, 4, 5, 6, 7, 7, 9]), "▃▄▅▆▇███");
    }

    #[test]
    fn counts_get_suffixes() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_500), "1.5K");
        assert_eq!(format_count(2_000_000), "2.0M");
    }
}
