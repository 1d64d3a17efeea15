//! Alerts view rendering.
//!
//! Top: thresholds flows are breaching right now. Bottom: the alerts that
//! cleared their cooldown since the doctor started, newest first.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_age;

/// Render the Alerts view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let issue_count = app.data.as_ref().map_or(0, |d| d.issues().len());
    let issues_height = (issue_count as u16).max(1) + 3;

    let chunks = Layout::vertical([
        Constraint::Length(issues_height.min(area.height / 2)),
        Constraint::Min(5),
    ])
    .split(area);

    render_issues(frame, app, chunks[0]);
    render_log(frame, app, chunks[1]);
}

fn render_issues(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Active issues ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.border());

    let issues = app.data.as_ref().map(|d| d.issues()).unwrap_or_default();
    if issues.is_empty() {
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled(" ✓ ", Style::default().fg(app.theme.healthy)),
            Span::raw("All flows within thresholds"),
        ]))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec!["Severity", "Flow", "Reason", "Observed", "Limit"])
        .height(1)
        .style(app.theme.header());

    let rows: Vec<Row> = issues
        .iter()
        .map(|issue| {
            Row::new(vec![
                Cell::from(issue.severity.as_str().to_uppercase())
                    .style(app.theme.severity_style(issue.severity)),
                Cell::from(issue.flow.label()).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(issue.reason.as_str()).style(app.theme.reason_style(issue.reason)),
                Cell::from(issue.observed.clone()),
                Cell::from(issue.limit.clone()),
            ])
            .style(app.theme.issue_row_style(issue))
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ];

    frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
}

fn render_log(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.alert_log.is_empty() {
        " Alert log ".to_string()
    } else {
        format!(
            " Alert log ({}) [{}/{}] [x:clear] ",
            app.alert_log.len(),
            app.selected_alert_index + 1,
            app.alert_log.len()
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.border());

    if app.alert_log.is_empty() {
        let hint = if app.source_description().starts_with("file:") {
            "  Alerts are only delivered live; replay a request log to see them here"
        } else {
            "  No alerts yet"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(hint, Style::default().add_modifier(Modifier::DIM))),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let now_ms = leadsbox_types::current_timestamp_ms();
    let header = Row::new(vec!["Age", "Severity", "Title", "Description"])
        .height(1)
        .style(app.theme.header());

    let rows: Vec<Row> = app
        .alert_log
        .iter()
        .map(|logged| {
            let alert = &logged.alert;
            Row::new(vec![
                Cell::from(format_age(logged.received_at_ms, now_ms)),
                Cell::from(alert.severity.as_str().to_uppercase())
                    .style(app.theme.severity_style(alert.severity)),
                Cell::from(alert.title.clone()),
                Cell::from(alert.description.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Length(9),
        Constraint::Fill(2),
        Constraint::Fill(4),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_alert_index));
    frame.render_stateful_widget(table, area, &mut state);
}
