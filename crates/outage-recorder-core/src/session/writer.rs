use crate::{CoreResult, DeviceInfo, LogRecord, RecorderError, Timestamp, session::format};

use std::{
    fs::OpenOptions,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Append-only writer owning the session's log file handle.
///
/// Every line goes straight to the handle without buffering so a crash
/// loses at most the line being written.
pub struct LogWriter {
    path: PathBuf,
    sink: Box<dyn Write + Send>,
    lines_written: u64,
}

impl LogWriter {
    /// Opens `path` for append, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns [`RecorderError::FileOpen`] if the file cannot be opened.
    #[track_caller]
    #[instrument]
    pub fn open(path: &Path) -> CoreResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| RecorderError::FileOpen {
                path: path.to_path_buf(),
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(path = ?path, "Log file opened");

        Ok(Self::from_writer(path, file))
    }

    /// Wraps an arbitrary sink. `path` is only used for diagnostics.
    pub fn from_writer(path: &Path, sink: impl Write + Send + 'static) -> Self {
        Self {
            path: path.to_path_buf(),
            sink: Box::new(sink),
            lines_written: 0,
        }
    }

    /// Appends the device, start time and column title lines.
    #[track_caller]
    pub fn append_header(&mut self, device: &DeviceInfo, started_at: &Timestamp) -> CoreResult<()> {
        self.append(&format::header(device, started_at))
    }

    /// Appends one status change line.
    #[track_caller]
    pub fn append_record(&mut self, record: &LogRecord) -> CoreResult<()> {
        self.append(&format::record(record))
    }

    /// Appends the record-cap line.
    #[track_caller]
    pub fn append_max_records_reached(&mut self, at: &Timestamp) -> CoreResult<()> {
        self.append(&format::max_records_reached(at))
    }

    /// Appends the footer, flushes and closes the handle.
    ///
    /// The handle is closed even when the footer cannot be written.
    #[track_caller]
    pub fn finish(mut self, stopped_at: &Timestamp) -> CoreResult<()> {
        self.append(&format::footer(stopped_at))?;
        self.sink.flush().map_err(|source| RecorderError::Write {
            source,
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?self.path, lines = self.lines_written, "Log file closed");

        Ok(())
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[track_caller]
    fn append(&mut self, text: &str) -> CoreResult<()> {
        self.sink
            .write_all(text.as_bytes())
            .map_err(|source| RecorderError::Write {
                source,
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.lines_written += text.lines().count() as u64;
        debug!(bytes = text.len(), "Appended to log");

        Ok(())
    }
}
