use serde::{Deserialize, Serialize};

/// Overrides for the device description in the log header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Hardware model (None = read from DMI).
    #[serde(default)]
    pub model: Option<String>,

    /// Operating system version (None = running kernel release).
    #[serde(default)]
    pub platform_version: Option<String>,
}
