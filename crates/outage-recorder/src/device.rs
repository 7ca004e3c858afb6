//! Device description for the log header.

use crate::config::DeviceConfig;

use std::{fs, path::Path};

use outage_recorder_core::DeviceInfo;
use tracing::{debug, instrument};

const UNKNOWN_MODEL: &str = "UnknownModel";
const OS_RELEASE_PATH: &str = "/proc/sys/kernel/osrelease";

/// Builds the header description, preferring configured values.
///
/// Falls back to the DMI product name under `sysfs_root` and the running
/// kernel release.
#[instrument(skip(overrides))]
pub fn detect_device(overrides: &DeviceConfig, sysfs_root: &Path) -> DeviceInfo {
    let model = overrides
        .model
        .clone()
        .or_else(|| read_trimmed(&sysfs_root.join("devices/virtual/dmi/id/product_name")))
        .unwrap_or_else(|| UNKNOWN_MODEL.to_string());

    let platform_version = overrides
        .platform_version
        .clone()
        .or_else(|| read_trimmed(Path::new(OS_RELEASE_PATH)))
        .unwrap_or_else(|| std::env::consts::OS.to_string());

    debug!(%model, %platform_version, "Device detected");

    DeviceInfo::new(model, platform_version)
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
