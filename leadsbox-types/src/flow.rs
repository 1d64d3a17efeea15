//! Monitored API flows.

use core::fmt;
use core::str::FromStr;

/// A named category of API operation whose health is tracked.
///
/// The set is closed: requests that do not classify into one of these
/// flows are never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Flow {
    /// Replying to an inbox thread.
    InboxSend,
    /// Capturing a lead from the sales quick-capture form.
    SalesQuickCapture,
    /// Scheduling a follow-up for a lead.
    FollowupSchedule,
}

impl Flow {
    /// Every known flow, in display order.
    pub const ALL: [Flow; 3] = [
        Flow::InboxSend,
        Flow::SalesQuickCapture,
        Flow::FollowupSchedule,
    ];

    /// Stable identifier used in storage keys and serialized state.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Flow::InboxSend => "inbox_send",
            Flow::SalesQuickCapture => "sales_quick_capture",
            Flow::FollowupSchedule => "followup_schedule",
        }
    }

    /// Human-readable name used in alert titles.
    pub const fn label(&self) -> &'static str {
        match self {
            Flow::InboxSend => "Inbox send",
            Flow::SalesQuickCapture => "Sales quick capture",
            Flow::FollowupSchedule => "Follow-up scheduling",
        }
    }

    /// Default p95 latency thresholds for this flow.
    pub const fn default_latency_thresholds(&self) -> LatencyThresholds {
        match self {
            Flow::InboxSend => LatencyThresholds::new(2_500, 5_000),
            Flow::SalesQuickCapture => LatencyThresholds::new(2_000, 4_000),
            Flow::FollowupSchedule => LatencyThresholds::new(2_000, 4_500),
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown flow identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFlow(pub String);

impl fmt::Display for UnknownFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown flow: {}", self.0)
    }
}

impl std::error::Error for UnknownFlow {}

impl FromStr for Flow {
    type Err = UnknownFlow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flow::ALL
            .into_iter()
            .find(|flow| flow.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFlow(s.to_string()))
    }
}

/// p95 latency thresholds in milliseconds.
///
/// A p95 strictly above `error_ms` raises an error; strictly above
/// `warning_ms` raises a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatencyThresholds {
    pub warning_ms: u64,
    pub error_ms: u64,
}

impl LatencyThresholds {
    pub const fn new(warning_ms: u64, error_ms: u64) -> Self {
        Self {
            warning_ms,
            error_ms,
        }
    }
}
