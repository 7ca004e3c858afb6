use std::{path::PathBuf, time::Instant};

use uuid::Uuid;

/// Host view of the recording lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingState {
    /// Not currently recording.
    Idle,
    /// A session is appending to `path`.
    Recording {
        /// When recording started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
        /// Log file of the session.
        path: PathBuf,
    },
}
