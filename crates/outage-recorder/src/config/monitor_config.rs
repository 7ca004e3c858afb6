use crate::config::{default_poll_interval_ms, default_sysfs_root};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Link and radio polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interface to watch (None = detected uplink).
    #[serde(default)]
    pub interface: Option<String>,

    /// Delay between two polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Mount point of sysfs.
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interface: None,
            poll_interval_ms: default_poll_interval_ms(),
            sysfs_root: default_sysfs_root(),
        }
    }
}
