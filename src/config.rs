//! Layered configuration for the doctor.
//!
//! Built-in defaults, then an optional TOML file, then `LEADSBOX_*`
//! environment variables (`__` separates nested keys, e.g.
//! `LEADSBOX_MONITOR__COOLDOWN_SECS=60`).

use std::path::Path;

use anyhow::Result;
use config::{Config, Environment, File};
use leadsbox_monitor::MonitorConfig;
use serde::Deserialize;

/// Everything the doctor can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DoctorConfig {
    /// Thresholds used to judge flows and to replay request logs.
    pub monitor: MonitorConfig,
}

impl DoctorConfig {
    /// Load configuration from `path` (if given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("LEADSBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
