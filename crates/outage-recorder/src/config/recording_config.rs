use crate::config::default_max_records;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// File outages are appended to.
    pub log_file: PathBuf,

    /// Accepted records after which recording stops itself.
    #[serde(default = "default_max_records")]
    pub max_records: u64,
}
