//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`summary`]: One row per flow with counts, latency and health
//! - [`alerts`]: Breached thresholds and the alert log
//! - [`detail`]: Modal overlay describing one flow
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content (summary/alerts)        │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlays rendered on top:
//!    - detail::render_overlay
//!    - common::render_help
//! ```

pub mod alerts;
pub mod common;
pub mod detail;
pub mod summary;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Row where table content starts: header, tabs, then the table border.
pub const CONTENT_START_ROW: u16 = 3;

/// Draw one full frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let top = (area.height / 2).saturating_sub(2);
        let centered = Rect::new(0, top, area.width, 5.min(area.height - top));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Summary => summary::render(frame, app, chunks[2]),
        View::Alerts => alerts::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_detail_overlay {
        detail::render_overlay(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use leadsbox_monitor::{Flow, Monitor, MonitorConfig, RequestOutcome};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn populated_app() -> App {
        let monitor = Monitor::new();
        let (feed, source) = ChannelSource::create("test");
        for i in 0..10 {
            let url = format!("/api/threads/{}/reply", i);
            for alert in monitor.observe(&RequestOutcome::new("POST", url, 6_000, 500, false)) {
                feed.publish_alert(alert);
            }
        }
        feed.publish_snapshot(monitor.snapshot());

        let mut app = App::with_theme(Box::new(source), MonitorConfig::default(), Theme::dark());
        app.reload_data().unwrap();
        app
    }

    #[test]
    fn draws_every_view() {
        let mut app = populated_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let summary = screen(&terminal);
        assert!(summary.contains("LEADSBOX DOCTOR"));
        assert!(summary.contains("Inbox send"));

        app.set_view(View::Alerts);
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let alerts = screen(&terminal);
        assert!(alerts.contains("Active issues"));
        assert!(alerts.contains("Alert log (2)"));

        app.set_view(View::Summary);
        app.select_row(0);
        app.enter_detail();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert!(screen(&terminal).contains("Flow Detail"));

        app.toggle_help();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert!(screen(&terminal).contains("Keyboard Shortcuts"));
    }

    #[test]
    fn small_terminal_shows_hint() {
        let mut app = populated_app();
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        assert!(screen(&terminal).contains("Terminal too small"));
    }

    #[test]
    fn detail_follows_selected_flow() {
        let app = populated_app();
        assert_eq!(app.detail_flow(), Some(Flow::InboxSend));
    }
}
