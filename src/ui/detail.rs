//! Detail overlay rendering.
//!
//! Displays a modal overlay with everything known about one flow.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::data::duration::{format_age, format_ms, format_opt_ms};
use crate::data::HealthStatus;
use crate::ui::summary::{format_count, render_sparkline};

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 16;

/// Render the flow detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(flow) = app.detail_flow() else {
        return;
    };
    let Some(row) = app.data.as_ref().and_then(|d| d.row(flow)) else {
        return;
    };
    let view = &row.view;

    let overlay_width = (area.width * 90 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = (area.height * 80 / 100).clamp(MIN_OVERLAY_HEIGHT, 24);
    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Length(9), // Metrics
        Constraint::Min(4),    // Issues
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== METRICS =====
    let health_label = match row.health() {
        HealthStatus::Healthy => "Healthy",
        HealthStatus::Warning => "Warning",
        HealthStatus::Error => "Error",
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let now_ms = leadsbox_types::current_timestamp_ms();

    let metric_lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", flow.label()), bold),
            Span::styled(format!("({})", flow.as_str()), Style::default().add_modifier(Modifier::DIM)),
            Span::raw("    "),
            Span::styled(
                format!("{} {}", row.health().symbol(), health_label),
                app.theme.status_style(row.health()).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Requests: "),
            Span::styled(format_count(view.total), bold),
            Span::raw("   Succeeded: "),
            Span::styled(format_count(view.success), bold),
            Span::raw("   Failed: "),
            Span::styled(format_count(view.failure), bold),
        ]),
        Line::from(vec![
            Span::raw(" Failure rate (window): "),
            Span::styled(format!("{:.1}%", view.failure_rate * 100.0), bold),
            Span::raw(format!(
                "   warn at {:.0}%, error at {:.0}%",
                app.config.error_rate_warning * 100.0,
                app.config.error_rate_error * 100.0
            )),
        ]),
        Line::from(vec![
            Span::raw(" Latency avg: "),
            Span::styled(format_opt_ms(view.avg_duration_ms), bold),
            Span::raw("   p95: "),
            Span::styled(format_opt_ms(view.p95_duration_ms), bold),
            Span::raw(format!(
                "   warn above {}, error above {}",
                format_ms(row.thresholds.warning_ms),
                format_ms(row.thresholds.error_ms)
            )),
        ]),
        Line::from(vec![
            Span::raw(format!(
                " Samples: {}/{} (alerts need {})",
                view.samples, app.config.window_size, app.config.min_samples
            )),
            Span::raw("   p95 trend: "),
            Span::raw(render_sparkline(&app.history.p95_sparkline(flow))),
        ]),
        Line::from(vec![
            Span::raw(" Last status: "),
            Span::styled(
                view.last_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                bold,
            ),
            Span::raw("   Last request: "),
            Span::raw(
                view.last_updated_at
                    .map(|at| format_age(at, now_ms))
                    .unwrap_or_else(|| "never".to_string()),
            ),
        ]),
    ];

    let header_block = Block::default()
        .title(" Flow Detail ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.accent));
    frame.render_widget(Paragraph::new(metric_lines).block(header_block), chunks[0]);

    // ===== ISSUES =====
    let issues_block = Block::default()
        .title(format!(" Issues ({}) ", row.issues.len()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.border());

    if row.issues.is_empty() {
        let text = if view.samples < app.config.min_samples {
            format!(
                "  Not judged yet: {} of {} samples",
                view.samples, app.config.min_samples
            )
        } else {
            "  Within thresholds".to_string()
        };
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(text, Style::default().add_modifier(Modifier::DIM))),
        ])
        .block(issues_block);
        frame.render_widget(empty, chunks[1]);
    } else {
        let header = Row::new(vec!["Severity", "Reason", "Observed", "Limit"])
            .height(1)
            .style(app.theme.header());
        let rows: Vec<Row> = row
            .issues
            .iter()
            .map(|issue| {
                Row::new(vec![
                    Cell::from(issue.severity.as_str().to_uppercase())
                        .style(app.theme.severity_style(issue.severity)),
                    Cell::from(issue.reason.as_str()).style(app.theme.reason_style(issue.reason)),
                    Cell::from(issue.observed.clone()),
                    Cell::from(issue.limit.clone()),
                ])
            })
            .collect();
        let widths = [
            Constraint::Length(9),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ];
        frame.render_widget(
            Table::new(rows, widths).header(header).block(issues_block),
            chunks[1],
        );
    }

    // ===== FOOTER =====
    let footer = Paragraph::new(Line::from(vec![Span::styled(
        " Press Esc to close ",
        Style::default().add_modifier(Modifier::DIM),
    )]));
    frame.render_widget(footer, chunks[2]);
}
