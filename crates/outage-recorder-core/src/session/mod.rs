mod dedup;
pub mod format;
mod recording;
mod writer;

pub use {
    dedup::StatusDeduplicator,
    format::{COLUMN_WIDTH, DeviceInfo, LogRecord, NO_WIFI_NAME},
    recording::{MAX_RECORDS, RecordingSession, SessionConfig, StopReason},
    writer::LogWriter,
};
