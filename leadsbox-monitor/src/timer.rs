//! Guard-style request timing.

use leadsbox_types::{Alert, Flow};

use crate::monitor::Monitor;

/// Measures one in-flight request against the monitor's clock.
///
/// Obtain with [`Monitor::start_request`]. Requests that do not classify
/// into a flow still produce a timer; finishing it records nothing.
///
/// # Example
///
/// ```rust
/// use leadsbox_monitor::{Flow, Monitor};
///
/// let monitor = Monitor::new();
/// let timer = monitor.start_request("POST", "/api/followups");
/// assert_eq!(timer.flow(), Some(Flow::FollowupSchedule));
///
/// // ... perform the request ...
/// let alerts = timer.finish(201, true);
/// assert!(alerts.is_empty());
/// ```
#[must_use = "a timer records nothing unless finished"]
#[derive(Debug)]
pub struct RequestTimer {
    monitor: Monitor,
    flow: Option<Flow>,
    started_ms: u64,
}

impl RequestTimer {
    pub(crate) fn new(monitor: Monitor, flow: Option<Flow>, started_ms: u64) -> Self {
        Self {
            monitor,
            flow,
            started_ms,
        }
    }

    /// Flow the request was classified into, if any.
    pub fn flow(&self) -> Option<Flow> {
        self.flow
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> u64 {
        self.monitor.clock().now_ms().saturating_sub(self.started_ms)
    }

    /// Record the request's outcome and return the alerts it fired.
    pub fn finish(self, status: u16, ok: bool) -> Vec<Alert> {
        match self.flow {
            Some(flow) => self
                .monitor
                .record_result(flow, self.elapsed_ms(), status, ok),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn elapsed_follows_the_clock() {
        let clock = Arc::new(ManualClock::new(10_000));
        let monitor = Monitor::builder().clock(clock.clone()).build();

        let timer = monitor.start_request("POST", "/api/threads/7/reply");
        clock.advance(Duration::from_millis(1_250));
        assert_eq!(timer.elapsed_ms(), 1_250);

        timer.finish(200, true);
        let snapshot = monitor.snapshot();
        let view = snapshot.get(Flow::InboxSend).unwrap();
        assert_eq!(view.total, 1);
        assert_eq!(view.p95_duration_ms, Some(1_250));
    }

    #[test]
    fn unclassified_timer_records_nothing() {
        let monitor = Monitor::new();
        let timer = monitor.start_request("GET", "/api/threads");
        assert_eq!(timer.flow(), None);
        assert!(timer.finish(200, true).is_empty());
        assert_eq!(monitor.snapshot().total_requests(), 0);
    }
}
