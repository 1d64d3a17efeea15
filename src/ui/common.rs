//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::HealthStatus;
use crate::ui::summary::{format_count, overall_health};

/// Render the header bar with overall flow health.
///
/// Displays: status indicator, flow counts by health, total requests and failures.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled("LEADSBOX DOCTOR ", Style::default().add_modifier(Modifier::BOLD));

    let Some(ref data) = app.data else {
        let line = Line::from(vec![Span::raw(" "), title, Span::raw("│ Loading...")]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (healthy, warning, error) = data.health_counts();
    let status_style = app.theme.status_style(overall_health(data));

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        title,
        Span::raw("│ "),
        count_span(app, healthy, HealthStatus::Healthy),
        Span::raw(" ok "),
        count_span(app, warning, HealthStatus::Warning),
        Span::raw(" warn "),
        count_span(app, error, HealthStatus::Error),
        Span::raw(" err │ "),
        Span::raw(format!(
            "{} requests, {} failed",
            format_count(data.total_requests()),
            format_count(data.total_failures())
        )),
        Span::raw(" │ "),
        Span::styled(
            app.source_description().to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn count_span(app: &App, count: usize, status: HealthStatus) -> Span<'static> {
    Span::styled(count.to_string(), app.theme.health_count_style(count, status))
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let issue_count = app.data.as_ref().map_or(0, |d| d.issues().len());
    let alerts_title = if issue_count > 0 {
        format!(" 2:Alerts ({}) ", issue_count)
    } else {
        " 2:Alerts ".to_string()
    };
    let titles: Vec<Line> = vec![Line::from(" 1:Summary "), Line::from(alerts_title)];

    let selected = match app.current_view {
        View::Summary => 0,
        View::Alerts => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive())
        .highlight_style(app.theme.tab_active())
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the view, time since last update and available controls,
/// or a temporary status message or load error.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.accent));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = if let Some(ref data) = app.data {
        let controls = match app.current_view {
            View::Summary => "s:sort S:reverse Tab:switch Enter:detail e:export ?:help q:quit",
            View::Alerts => "↑↓:select x:clear Tab:switch Enter:detail ?:help q:quit",
        };
        let error = app
            .load_error
            .as_deref()
            .map(|e| format!(" | {}", e))
            .unwrap_or_default();

        format!(
            " {} | Updated {:.1}s ago{} | {}",
            app.current_view.label(),
            data.last_updated.elapsed().as_secs_f64(),
            error,
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        " Loading... | q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header())]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2         Summary / Alerts"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Flow detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Summary"),
        Line::from("  s         Cycle sort column"),
        Line::from("  S         Toggle sort direction"),
        Line::from(""),
        section(" Alerts"),
        Line::from("  x         Clear alert log"),
        Line::from(""),
        section(" General"),
        Line::from("  r         Reload data"),
        Line::from("  e         Export snapshot to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.accent));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 26u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
