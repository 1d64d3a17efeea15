//! File-based data source.
//!
//! Polls a persisted monitoring state file (`<key>.json`, as written by
//! [`leadsbox_monitor::FileStore`]) and summarizes it into a snapshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use leadsbox_monitor::{summarize, MonitorConfig, MonitoringState, Snapshot};

use super::DataSource;

/// A data source that reads the monitoring state blob from a JSON file.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    config: MonitorConfig,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    ///
    /// `config` supplies the window size and thresholds the state is judged by.
    pub fn new<P: AsRef<Path>>(path: P, config: MonitorConfig) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            config,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&mut self) -> Option<Snapshot> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                return None;
            }
        };

        match serde_json::from_str::<MonitoringState>(&content) {
            Ok(mut state) => {
                self.last_error = None;
                state.normalize(self.config.window_size);
                Some(summarize(
                    &state,
                    &self.config,
                    leadsbox_types::current_timestamp_ms(),
                ))
            }
            Err(e) => {
                self.last_error = Some(format!("Parse error: {}", e));
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Snapshot> {
        let current_modified = self.modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(snapshot) = self.read_file() {
                self.last_modified = current_modified;
                return Some(snapshot);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadsbox_monitor::{FileStore, Flow, HealthStatus, Monitor, STATE_KEY};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "flows": {
                "sales_quick_capture": {
                    "total": 3, "success": 2, "failure": 1,
                    "recentDurations": [120, 340, 90],
                    "recentOutcomes": [0, 1, 0],
                    "lastStatus": 201
                }
            },
            "alertCooldowns": {}
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/state.json", MonitorConfig::default());
        assert_eq!(source.path(), Path::new("/tmp/state.json"));
        assert_eq!(source.description(), "file: /tmp/state.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path(), MonitorConfig::default());

        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.len(), 3);
        let capture = snapshot.get(Flow::SalesQuickCapture).unwrap();
        assert_eq!(capture.total, 3);
        assert_eq!(capture.p95_duration_ms, Some(340));
        assert_eq!(capture.health, HealthStatus::Healthy);

        // Unchanged file yields nothing new
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_reads_monitor_output() {
        let dir = tempfile::tempdir().unwrap();
        let monitor = Monitor::builder().store(FileStore::new(dir.path())).build();
        monitor.record_result(Flow::InboxSend, 250, 201, true);

        let path = dir.path().join(format!("{}.json", STATE_KEY));
        let mut source = FileSource::new(&path, MonitorConfig::default());
        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.total_requests(), 1);
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/state.json", MonitorConfig::default());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path(), MonitorConfig::default());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().contains("Parse error"));
    }
}
