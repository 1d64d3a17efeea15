//! Request log replay.
//!
//! A replay log is newline-delimited JSON, one [`RequestOutcome`] per line
//! (`{"url": "...", "method": "POST", "durationMs": 180, "status": 201, "ok": true}`).
//! Blank lines and lines starting with `#` are skipped.
//!
//! Replays run against a [`ManualClock`] that advances by a fixed spacing per
//! request, so cooldowns behave as they would have over the original session
//! regardless of how fast the log is fed.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use leadsbox_monitor::{
    Alert, FileStore, ManualClock, MemoryStore, Monitor, MonitorConfig, RequestOutcome, Snapshot,
};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::data::duration::format_opt_ms;
use crate::source::SnapshotFeed;

/// Parse a replay log.
pub fn read_outcomes<R: BufRead>(reader: R) -> Result<Vec<RequestOutcome>> {
    let mut outcomes = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let outcome = serde_json::from_str(trimmed)
            .with_context(|| format!("line {}: invalid request outcome", index + 1))?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Open and parse a replay log file.
pub fn load_outcomes(path: &Path) -> Result<Vec<RequestOutcome>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_outcomes(BufReader::new(file))
}

/// What a replay did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    /// Lines fed to the monitor.
    pub observed: usize,
    /// Lines that classified into a monitored flow.
    pub recorded: usize,
    /// Alerts that cleared their cooldown, in firing order.
    pub alerts: Vec<Alert>,
}

impl ReplayReport {
    fn absorb(&mut self, recorded: bool, alerts: Vec<Alert>) {
        self.observed += 1;
        if recorded {
            self.recorded += 1;
        }
        self.alerts.extend(alerts);
    }
}

/// A monitor driven by a manual clock.
#[derive(Debug, Clone)]
pub struct Replayer {
    monitor: Monitor,
    clock: Arc<ManualClock>,
    spacing: Duration,
}

impl Replayer {
    /// Build a replay monitor.
    ///
    /// With `state_dir` the state is persisted there as `<key>.json`, so a
    /// later replay continues from it; otherwise it lives in memory.
    pub fn new(config: MonitorConfig, state_dir: Option<&Path>, spacing: Duration) -> Self {
        let clock = Arc::new(ManualClock::new(leadsbox_types::current_timestamp_ms()));
        let builder = Monitor::builder().config(config).clock(clock.clone());
        let monitor = match state_dir {
            Some(dir) => builder.store(FileStore::new(dir)).build(),
            None => builder.store(MemoryStore::new()).build(),
        };
        Self {
            monitor,
            clock,
            spacing,
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Feed one outcome and advance the clock.
    fn step(&self, outcome: &RequestOutcome, report: &mut ReplayReport) {
        let recorded = self.monitor.classify(&outcome.url, &outcome.method).is_some();
        let alerts = self.monitor.observe(outcome);
        if !recorded {
            debug!(method = %outcome.method, url = %outcome.url, "Request not monitored");
        }
        report.absorb(recorded, alerts);
        self.clock.advance(self.spacing);
    }

    /// Feed every outcome synchronously.
    pub fn run(&self, outcomes: &[RequestOutcome]) -> ReplayReport {
        let mut report = ReplayReport::default();
        for outcome in outcomes {
            self.step(outcome, &mut report);
        }
        info!(
            observed = report.observed,
            recorded = report.recorded,
            alerts = report.alerts.len(),
            "Replay finished"
        );
        report
    }

    /// Feed outcomes in the background, publishing a snapshot after each one
    /// and forwarding alerts as they fire.
    ///
    /// `pace` is the real time waited between requests.
    ///
    /// ```
    /// use std::time::Duration;
    /// use leadsbox_doctor::{ChannelSource, DataSource, Replayer};
    /// use leadsbox_monitor::{MonitorConfig, RequestOutcome};
    ///
    /// # tokio_test::block_on(async {
    /// let (feed, mut source) = ChannelSource::create("replay");
    /// let replayer = Replayer::new(MonitorConfig::default(), None, Duration::from_secs(1));
    /// let outcomes = vec![RequestOutcome::new("POST", "/api/followups", 320, 201, true)];
    ///
    /// let report = replayer.spawn(outcomes, Duration::ZERO, feed).await.unwrap();
    /// assert_eq!(report.recorded, 1);
    /// assert_eq!(source.poll().unwrap().total_requests(), 1);
    /// # });
    /// ```
    pub fn spawn(
        self,
        outcomes: Vec<RequestOutcome>,
        pace: Duration,
        feed: SnapshotFeed,
    ) -> JoinHandle<ReplayReport> {
        tokio::spawn(async move {
            let alert_feed = feed.clone();
            let subscription = self.monitor.subscribe(move |alert| {
                alert_feed.publish_alert(alert.clone());
            });

            let mut report = ReplayReport::default();
            feed.publish_snapshot(self.monitor.snapshot());

            for outcome in &outcomes {
                self.step(outcome, &mut report);
                if !feed.publish_snapshot(self.monitor.snapshot()) {
                    debug!("Snapshot consumer gone, stopping replay");
                    break;
                }
                if !pace.is_zero() {
                    tokio::time::sleep(pace).await;
                }
            }

            subscription.unsubscribe();
            report
        })
    }
}

/// Plain-text replay summary: counts, per-flow health, then every alert.
pub fn render_report<W: Write>(report: &ReplayReport, snapshot: &Snapshot, out: &mut W) -> Result<()> {
    writeln!(
        out,
        "Replayed {} requests ({} monitored), {} alerts",
        report.observed,
        report.recorded,
        report.alerts.len()
    )?;

    writeln!(out)?;
    writeln!(
        out,
        "{:<22} {:>8} {:>8} {:>9} {:>9}  {}",
        "flow", "requests", "failed", "avg", "p95", "health"
    )?;
    for (flow, view) in snapshot.iter() {
        writeln!(
            out,
            "{:<22} {:>8} {:>7.0}% {:>9} {:>9}  {}",
            flow.as_str(),
            view.total,
            view.failure_rate * 100.0,
            format_opt_ms(view.avg_duration_ms),
            format_opt_ms(view.p95_duration_ms),
            view.health.symbol()
        )?;
    }

    if !report.alerts.is_empty() {
        writeln!(out)?;
        for alert in &report.alerts {
            writeln!(
                out,
                "[{}] {}: {}",
                alert.severity.as_str().to_uppercase(),
                alert.title,
                alert.description
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChannelSource, DataSource};
    use leadsbox_monitor::{AlertReason, Flow, Severity, STATE_KEY};
    use std::io::Cursor;

    fn slow_sends(count: usize) -> Vec<RequestOutcome> {
        (0..count)
            .map(|i| RequestOutcome::new("POST", format!("/api/threads/{}/reply", i), 6_000, 201, true))
            .collect()
    }

    #[test]
    fn test_read_outcomes_skips_comments() {
        let log = r#"
# captured from staging
{"url":"/api/threads/1/reply","method":"POST","durationMs":120,"status":201,"ok":true}

{"url":"/api/followups","method":"post","durationMs":900,"ok":false}
"#;
        let outcomes = read_outcomes(Cursor::new(log)).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].status, 0);
        assert!(!outcomes[1].ok);
    }

    #[test]
    fn test_read_outcomes_reports_line() {
        let log = "{\"url\":\"/a\",\"method\":\"GET\",\"durationMs\":1,\"ok\":true}\nnope\n";
        let err = read_outcomes(Cursor::new(log)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_run_counts_and_alerts() {
        let replayer = Replayer::new(MonitorConfig::default(), None, Duration::from_secs(1));
        let mut outcomes = slow_sends(8);
        outcomes.push(RequestOutcome::new("GET", "/api/threads", 50, 200, true));

        let report = replayer.run(&outcomes);
        assert_eq!(report.observed, 9);
        assert_eq!(report.recorded, 8);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].reason, AlertReason::Latency);
        assert_eq!(report.alerts[0].severity, Severity::Error);
    }

    #[test]
    fn test_spacing_clears_cooldown() {
        // 8 samples to arm, then one request six minutes later
        let replayer = Replayer::new(MonitorConfig::default(), None, Duration::from_secs(360));
        let report = replayer.run(&slow_sends(9));
        assert_eq!(report.alerts.len(), 2);

        let tight = Replayer::new(MonitorConfig::default(), None, Duration::from_secs(1));
        assert_eq!(tight.run(&slow_sends(9)).alerts.len(), 1);
    }

    #[test]
    fn test_state_dir_persists() {
        let dir = tempfile::tempdir().unwrap();
        let replayer = Replayer::new(MonitorConfig::default(), Some(dir.path()), Duration::ZERO);
        replayer.run(&slow_sends(3));

        assert!(dir.path().join(format!("{}.json", STATE_KEY)).exists());
        let again = Replayer::new(MonitorConfig::default(), Some(dir.path()), Duration::ZERO);
        assert_eq!(again.monitor().snapshot().get(Flow::InboxSend).unwrap().total, 3);
    }

    #[test]
    fn test_render_report() {
        let replayer = Replayer::new(MonitorConfig::default(), None, Duration::from_secs(1));
        let report = replayer.run(&slow_sends(8));
        let mut out = Vec::new();
        render_report(&report, &replayer.monitor().snapshot(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Replayed 8 requests (8 monitored), 1 alerts"));
        assert!(text.contains("inbox_send"));
        assert!(text.contains("6.00s"));
        assert!(text.contains("[ERROR] Inbox send is very slow"));
    }

    #[tokio::test]
    async fn test_spawn_feeds_channel_source() {
        let (feed, mut source) = ChannelSource::create("replay");
        let replayer = Replayer::new(MonitorConfig::default(), None, Duration::from_secs(1));

        let report = replayer
            .clone()
            .spawn(slow_sends(8), Duration::ZERO, feed)
            .await
            .unwrap();

        assert_eq!(report.recorded, 8);
        assert_eq!(source.poll().unwrap().total_requests(), 8);
        assert_eq!(source.drain_alerts().len(), 1);
        assert_eq!(replayer.monitor().listener_count(), 0);
    }
}
