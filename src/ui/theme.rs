//! Colours for flow health, alert severities and threshold issues.
//!
//! One palette per terminal background; [`Theme::auto_detect`] picks by
//! luminance.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use leadsbox_monitor::{
    error_rate_severity, latency_severity, AlertReason, LatencyThresholds, MonitorConfig,
    Severity,
};

use crate::data::{FlowIssue, HealthStatus};

/// Backgrounds brighter than this get the light palette.
const LIGHT_LUMA: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Dark,
    Light,
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Background,
    /// Titles, active tab, overlay borders.
    pub accent: Color,
    pub healthy: Color,
    pub warning: Color,
    pub error: Color,
    /// Tint for latency issues and p95 figures.
    pub latency: Color,
    /// Tint for error-rate issues and failure percentages.
    pub error_rate: Color,
    /// Borders and secondary text.
    pub muted: Color,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: Background::Dark,
            accent: Color::Cyan,
            healthy: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            latency: Color::Magenta,
            error_rate: Color::LightRed,
            muted: Color::Gray,
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            background: Background::Light,
            accent: Color::Blue,
            healthy: Color::Green,
            warning: Color::Rgb(176, 120, 0),
            error: Color::Red,
            latency: Color::Magenta,
            error_rate: Color::Rgb(170, 40, 40),
            muted: Color::DarkGray,
            border_type: BorderType::Rounded,
        }
    }

    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > LIGHT_LUMA => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn header(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn selected(&self) -> Style {
        let bg = match self.background {
            Background::Dark => Color::DarkGray,
            Background::Light => Color::LightBlue,
        };
        Style::default().bg(bg).add_modifier(Modifier::BOLD)
    }

    pub fn tab_active(&self) -> Style {
        self.header()
    }

    pub fn tab_inactive(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn status_style(&self, status: HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy),
            HealthStatus::Warning => Style::default().fg(self.warning),
            HealthStatus::Error => Style::default().fg(self.error).add_modifier(Modifier::BOLD),
        }
    }

    pub fn severity_style(&self, severity: Severity) -> Style {
        self.status_style(HealthStatus::from(Some(severity)))
    }

    pub fn reason_style(&self, reason: AlertReason) -> Style {
        match reason {
            AlertReason::Latency => Style::default().fg(self.latency),
            AlertReason::ErrorRate => Style::default().fg(self.error_rate),
        }
    }

    /// Whole-row style for a breached threshold; errors stand out.
    pub fn issue_row_style(&self, issue: &FlowIssue) -> Style {
        match issue.severity {
            Severity::Error => Style::default().add_modifier(Modifier::BOLD),
            Severity::Warning => Style::default(),
        }
    }

    /// Count of flows in a health state, dimmed when zero.
    pub fn health_count_style(&self, count: usize, status: HealthStatus) -> Style {
        if count == 0 && status != HealthStatus::Healthy {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            self.status_style(status)
        }
    }

    /// p95 figure coloured by the threshold it crosses.
    pub fn latency_style(&self, p95_ms: Option<u64>, thresholds: LatencyThresholds) -> Style {
        p95_ms
            .and_then(|p95| latency_severity(p95, thresholds))
            .map_or_else(Style::default, |severity| self.severity_style(severity))
    }

    /// Failure percentage coloured by the configured error-rate thresholds.
    pub fn failure_rate_style(&self, rate: f64, samples: usize, config: &MonitorConfig) -> Style {
        if samples == 0 {
            return Style::default();
        }
        error_rate_severity(rate, config)
            .map_or_else(Style::default, |severity| self.severity_style(severity))
    }
}
