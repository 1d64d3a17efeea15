//! End-to-end paths through the doctor: monitor state on disk, replay logs,
//! exports and follow-up agendas.

use std::fs;
use std::time::Duration;

use leadsbox_doctor::{agenda, export, replay, DashboardData, DataSource, FileSource, Replayer};
use leadsbox_monitor::{
    AlertReason, FileStore, Flow, HealthStatus, Monitor, MonitorConfig, RequestOutcome, Severity,
    Snapshot, STATE_KEY,
};

#[test]
fn file_source_reads_what_the_monitor_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let monitor = Monitor::builder().store(FileStore::new(dir.path())).build();

    for i in 0..10 {
        let url = format!("https://api.leadsbox.app/api/threads/{}/reply", i);
        monitor.observe(&RequestOutcome::new("POST", url, 3_000, 201, true));
    }
    monitor.observe(&RequestOutcome::new("POST", "/api/followups", 400, 500, false));

    let config = MonitorConfig::default();
    let mut source = FileSource::new(dir.path().join(format!("{}.json", STATE_KEY)), config.clone());
    let snapshot = source.poll().expect("state file should be readable");
    assert!(source.error().is_none());

    let data = DashboardData::from_snapshot(snapshot, &config);
    assert_eq!(data.total_requests(), 11);
    assert_eq!(data.total_failures(), 1);

    let inbox = data.row(Flow::InboxSend).unwrap();
    assert_eq!(inbox.health(), HealthStatus::Warning);
    assert_eq!(inbox.issues.len(), 1);
    assert_eq!(inbox.issues[0].reason, AlertReason::Latency);

    // one failed sample is not enough to judge
    assert!(data.row(Flow::FollowupSchedule).unwrap().issues.is_empty());
}

#[test]
fn headless_replay_exports_a_readable_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("requests.ndjson");
    let mut lines = String::from("# quick capture outage\n");
    for _ in 0..8 {
        lines.push_str(
            r#"{"url":"/api/sales/quick-capture","method":"POST","durationMs":900,"status":503,"ok":false}"#,
        );
        lines.push('\n');
    }
    lines.push_str(r#"{"url":"/api/leads","method":"GET","durationMs":40,"status":200,"ok":true}"#);
    fs::write(&log, lines).unwrap();

    let outcomes = replay::load_outcomes(&log).unwrap();
    let replayer = Replayer::new(MonitorConfig::default(), None, Duration::from_secs(1));
    let report = replayer.run(&outcomes);

    assert_eq!(report.observed, 9);
    assert_eq!(report.recorded, 8);
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].flow, Flow::SalesQuickCapture);
    assert_eq!(report.alerts[0].reason, AlertReason::ErrorRate);
    assert_eq!(report.alerts[0].severity, Severity::Error);

    let out = dir.path().join("snapshot.json");
    export::write_snapshot(&replayer.monitor().snapshot(), &out).unwrap();

    let exported: Snapshot = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let capture = exported.get(Flow::SalesQuickCapture).unwrap();
    assert_eq!(capture.failure, 8);
    assert_eq!(capture.health, HealthStatus::Error);
    assert_eq!(exported.get(Flow::InboxSend).unwrap().total, 0);
}

#[test]
fn agenda_from_payload_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("followups.json");
    fs::write(
        &path,
        r#"{"data": {"followUps": [
            {"id": "a", "provider": "EMAIL", "status": "SCHEDULED",
             "scheduledTime": "2025-03-09T16:00:00Z"},
            {"id": "b", "provider": "WHATSAPP", "status": "SCHEDULED",
             "scheduledTime": "2025-03-10T18:00:00Z",
             "metadata": {"priority": "high", "title": "Send quote"}},
            {"id": "c", "provider": "SMS", "status": "SENT",
             "scheduledTime": "2025-03-08T10:00:00Z"}
        ]}}"#,
    )
    .unwrap();

    let reference = agenda::reference_time(Some("2025-03-10T12:00:00+01:00")).unwrap();
    let buckets = agenda::load_agenda(&path, &reference).unwrap();
    assert_eq!(buckets.overdue.len(), 1);
    assert_eq!(buckets.today.len(), 1);
    assert_eq!(buckets.completed.len(), 1);

    let mut out = Vec::new();
    agenda::render_agenda(&buckets, &reference, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Today (1)"));
    assert!(text.contains("HIGH   2025-03-10 19:00  Send quote"));
    assert!(text.contains("Email reminder"));
}
