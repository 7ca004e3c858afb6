mod device_config;
#[allow(clippy::module_inception)]
mod config;
mod monitor_config;
mod recording_config;

pub(crate) use {
    config::Config, device_config::DeviceConfig, monitor_config::MonitorConfig,
    recording_config::RecordingConfig,
};

pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub(crate) const DEFAULT_SYSFS_ROOT: &str = "/sys";
pub(crate) const DEFAULT_LOG_FILE_NAME: &str = "outages.log";

pub(crate) fn default_max_records() -> u64 {
    outage_recorder_core::MAX_RECORDS
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_sysfs_root() -> std::path::PathBuf {
    std::path::PathBuf::from(DEFAULT_SYSFS_ROOT)
}
