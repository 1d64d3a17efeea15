//! Snapshot export.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use leadsbox_monitor::{summarize, MonitorConfig, MonitoringState, Snapshot};

/// Write `snapshot` to `path` as pretty JSON.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Summarize a persisted state file into a snapshot.
pub fn snapshot_from_state_file(path: &Path, config: &MonitorConfig) -> Result<Snapshot> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut state: MonitoringState = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a monitoring state blob", path.display()))?;
    state.normalize(config.window_size);
    Ok(summarize(
        &state,
        config,
        leadsbox_types::current_timestamp_ms(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadsbox_monitor::{FileStore, Flow, Monitor, STATE_KEY};

    #[test]
    fn exports_monitor_state() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = Monitor::builder().store(FileStore::new(dir.path())).build();
        monitor.record_result(Flow::FollowupSchedule, 700, 500, false);

        let state_path = dir.path().join(format!("{}.json", STATE_KEY));
        let snapshot = snapshot_from_state_file(&state_path, &MonitorConfig::default()).unwrap();
        let out = dir.path().join("export.json");
        write_snapshot(&snapshot, &out).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let flow = &json["flows"]["followup_schedule"];
        assert_eq!(flow["total"], 1);
        assert_eq!(flow["failureRate"], 1.0);
        assert_eq!(flow["p95DurationMs"], 700);
        assert_eq!(flow["lastStatus"], 500);
    }

    #[test]
    fn rejects_non_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "\"not a state\"").unwrap();
        assert!(snapshot_from_state_file(&path, &MonitorConfig::default()).is_err());
    }
}
