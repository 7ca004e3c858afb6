use crate::AppResult;

use std::path::PathBuf;

use outage_recorder_core::StopReason;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Commands sent to the main application loop.
#[derive(Debug)]
pub enum AppCommand {
    /// Start a new recording session.
    StartRecording {
        /// File to append outages to.
        path: PathBuf,
        /// Unique session ID for this recording.
        session_id: Uuid,
        /// Receives the outcome of the start request.
        reply: oneshot::Sender<AppResult<()>>,
    },
    /// A session closed itself or was closed by another path.
    SessionEnded {
        /// Session ID of the recording that ended.
        session_id: Uuid,
        /// Why it ended.
        reason: StopReason,
    },
    /// Request application shutdown.
    Shutdown,
}
