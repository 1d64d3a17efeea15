//! Application state and navigation logic.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use leadsbox_monitor::{Alert, Flow, MonitorConfig, Snapshot};

use crate::data::{DashboardData, FlowRow, History};
use crate::source::DataSource;
use crate::ui::summary::{sorted_rows, SortColumn};
use crate::ui::Theme;

/// Alerts kept in the log before the oldest are dropped.
pub const MAX_ALERT_LOG: usize = 100;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
///
/// Flow detail is shown as an overlay (controlled by `App::show_detail_overlay`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// One row per flow with counts, latency and health.
    Summary,
    /// Breached thresholds and the alerts fired so far.
    Alerts,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Summary => View::Alerts,
            View::Alerts => View::Summary,
        }
    }

    pub fn prev(self) -> Self {
        self.next()
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Summary => "Summary",
            View::Alerts => "Alerts",
        }
    }
}

/// An alert as received by the doctor.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedAlert {
    pub alert: Alert,
    /// When the doctor received it (unix ms).
    pub received_at_ms: u64,
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    pub show_detail_overlay: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub config: MonitorConfig,
    pub snapshot: Option<Snapshot>,
    pub data: Option<DashboardData>,
    pub history: History,
    pub load_error: Option<String>,

    /// Newest first.
    pub alert_log: VecDeque<LoggedAlert>,

    // Navigation state
    pub selected_flow_index: usize,
    pub selected_alert_index: usize,

    // Sorting (Summary view)
    pub sort_column: SortColumn,
    pub sort_ascending: bool,

    pub theme: Theme,
    pub export_path: PathBuf,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App reading from `source`, judging flows with `config`.
    pub fn new(source: Box<dyn DataSource>, config: MonitorConfig) -> Self {
        Self::with_theme(source, config, Theme::auto_detect())
    }

    /// Create a new App with an explicit theme (no terminal probing).
    pub fn with_theme(source: Box<dyn DataSource>, config: MonitorConfig, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Summary,
            show_help: false,
            show_detail_overlay: false,
            source,
            config,
            snapshot: None,
            data: None,
            history: History::new(),
            load_error: None,
            alert_log: VecDeque::new(),
            selected_flow_index: 0,
            selected_alert_index: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            theme,
            export_path: PathBuf::from("leadsbox_snapshot.json"),
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for new data and alerts.
    ///
    /// Returns Ok(true) if a new snapshot was received.
    pub fn reload_data(&mut self) -> Result<bool> {
        let now_ms = leadsbox_types::current_timestamp_ms();
        for alert in self.source.drain_alerts() {
            self.push_alert(alert, now_ms);
        }

        if let Some(snapshot) = self.source.poll() {
            let data = DashboardData::from_snapshot(snapshot.clone(), &self.config);

            self.history.record(&data);
            self.snapshot = Some(snapshot);
            self.data = Some(data);
            self.load_error = None;
            self.clamp_selection();
            return Ok(true);
        }

        if let Some(err) = self.source.error() {
            self.load_error = Some(err.to_string());
        }
        Ok(false)
    }

    /// Add an alert to the front of the log, dropping the oldest past the limit.
    pub fn push_alert(&mut self, alert: Alert, received_at_ms: u64) {
        self.alert_log.push_front(LoggedAlert {
            alert,
            received_at_ms,
        });
        self.alert_log.truncate(MAX_ALERT_LOG);
        // Keep the same entry selected as new ones arrive on top
        if self.current_view == View::Alerts && self.selected_alert_index > 0 {
            self.selected_alert_index =
                (self.selected_alert_index + 1).min(self.alert_log.len().saturating_sub(1));
        }
    }

    pub fn clear_alert_log(&mut self) {
        self.alert_log.clear();
        self.selected_alert_index = 0;
    }

    fn clamp_selection(&mut self) {
        let flows = self.data.as_ref().map_or(0, |d| d.flows.len());
        self.selected_flow_index = self.selected_flow_index.min(flows.saturating_sub(1));
        self.selected_alert_index = self
            .selected_alert_index
            .min(self.alert_log.len().saturating_sub(1));
    }

    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        self.show_detail_overlay = false;
    }

    fn list_len(&self) -> usize {
        match self.current_view {
            View::Summary => self.data.as_ref().map_or(0, |d| d.flows.len()),
            View::Alerts => self.alert_log.len(),
        }
    }

    fn selection_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Summary => &mut self.selected_flow_index,
            View::Alerts => &mut self.selected_alert_index,
        }
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let max = self.list_len().saturating_sub(1);
        let selected = self.selection_mut();
        *selected = (*selected + n).min(max);
    }

    pub fn select_prev_n(&mut self, n: usize) {
        let selected = self.selection_mut();
        *selected = selected.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        *self.selection_mut() = 0;
    }

    pub fn select_last(&mut self) {
        let last = self.list_len().saturating_sub(1);
        *self.selection_mut() = last;
    }

    /// Select a row by its visual position, ignoring rows past the end.
    pub fn select_row(&mut self, row: usize) {
        if row < self.list_len() {
            *self.selection_mut() = row;
        }
    }

    /// The flow row under the cursor in the Summary view's current sort order.
    pub fn selected_row(&self) -> Option<&FlowRow> {
        let data = self.data.as_ref()?;
        sorted_rows(data, self.sort_column, self.sort_ascending)
            .into_iter()
            .nth(self.selected_flow_index)
    }

    pub fn selected_alert(&self) -> Option<&LoggedAlert> {
        self.alert_log.get(self.selected_alert_index)
    }

    /// The flow the detail overlay describes.
    pub fn detail_flow(&self) -> Option<Flow> {
        match self.current_view {
            View::Summary => self.selected_row().map(|row| row.flow),
            View::Alerts => self.selected_alert().map(|logged| logged.alert.flow),
        }
    }

    /// Open the detail overlay for the current selection.
    pub fn enter_detail(&mut self) {
        if self.detail_flow().is_some() {
            self.show_detail_overlay = true;
        }
    }

    /// Navigate back: close overlay first, then go to Summary.
    pub fn go_back(&mut self) {
        if self.show_detail_overlay {
            self.show_detail_overlay = false;
        } else if self.current_view != View::Summary {
            self.set_view(View::Summary);
        }
    }

    pub fn close_overlay(&mut self) {
        self.show_detail_overlay = false;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn cycle_sort(&mut self) {
        if self.current_view == View::Summary {
            self.sort_column = self.sort_column.next();
        }
    }

    pub fn toggle_sort_direction(&mut self) {
        if self.current_view == View::Summary {
            self.sort_ascending = !self.sort_ascending;
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Write the latest snapshot to `path` as pretty JSON.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref snapshot) = self.snapshot else {
            anyhow::bail!("No data to export");
        };
        crate::export::write_snapshot(snapshot, path)
    }
}
