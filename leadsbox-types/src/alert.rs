//! Alert vocabulary shared by the monitor and its listeners.

use core::fmt;

use crate::Flow;

/// Why an alert fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AlertReason {
    /// p95 latency over the recent window crossed a threshold.
    Latency,
    /// Failure rate over the recent window crossed a threshold.
    ErrorRate,
}

impl AlertReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlertReason::Latency => "latency",
            AlertReason::ErrorRate => "error_rate",
        }
    }
}

impl fmt::Display for AlertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity. `Error` outranks `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An advisory alert about degraded flow health.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alert {
    pub flow: Flow,
    pub reason: AlertReason,
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Alert {
    /// Key used to rate-limit repeats of this alert.
    pub fn cooldown_key(&self) -> String {
        cooldown_key(self.flow, self.reason, self.severity)
    }
}

/// Composite `(flow, reason, severity)` cooldown key, e.g.
/// `inbox_send:latency:warning`.
pub fn cooldown_key(flow: Flow, reason: AlertReason, severity: Severity) -> String {
    format!("{}:{}:{}", flow.as_str(), reason.as_str(), severity.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_key_format() {
        assert_eq!(
            cooldown_key(Flow::InboxSend, AlertReason::ErrorRate, Severity::Error),
            "inbox_send:error_rate:error"
        );
    }

    #[test]
    fn error_outranks_warning() {
        assert!(Severity::Error > Severity::Warning);
    }
}
