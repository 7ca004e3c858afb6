use error_location::ErrorLocation;
use thiserror::Error;

/// Recording errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// The target log file could not be opened for append.
    #[error("Failed to open log file {path:?}: {source} {location}")]
    FileOpen {
        /// Path of the log file.
        path: std::path::PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Appending to the open log file failed.
    #[error("Failed to write log record: {source} {location}")]
    Write {
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `start` was called on a session that is already recording.
    #[error("Already recording to {path:?} {location}")]
    AlreadyRecording {
        /// File the running session writes to.
        path: std::path::PathBuf,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Registering with the event source failed.
    #[error("Subscription failed: {reason} {location}")]
    Subscription {
        /// Description of the subscription failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
