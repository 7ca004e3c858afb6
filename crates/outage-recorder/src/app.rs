use crate::{AppCommand, AppError, AppResult, RecordingState, log_file::validate_log_path};

use std::{
    panic::Location,
    path::PathBuf,
    sync::Arc,
    time::Instant,
};

use error_location::ErrorLocation;
use outage_recorder_core::{
    Clock, EventSource, NotificationHub, RecordingSession, SessionConfig, StopReason,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Main application state.
///
/// Owns the recording session and reacts to commands from the CLI driver,
/// the session stop listener and Ctrl-C. Signals `shutdown_tx` when done so
/// the link monitor stops polling.
pub struct App {
    pub(crate) hub: Arc<NotificationHub>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) session_config: SessionConfig,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) state: RecordingState,
    pub(crate) session: Option<RecordingSession>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Outage recorder starting");

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                result = &mut ctrl_c => {
                    match result {
                        Ok(()) => info!("Interrupted, shutting down"),
                        Err(e) => error!(error = ?e, "Failed to listen for Ctrl-C, shutting down"),
                    }
                    break;
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::StartRecording { path, session_id, reply } => {
                            let result = self.start_recording(path, session_id);
                            if let Err(e) = &result {
                                error!(session_id = %session_id, error = ?e, "Failed to start recording");
                            }
                            if reply.send(result).is_err() {
                                debug!(session_id = %session_id, "Start requester went away");
                            }
                        }
                        AppCommand::SessionEnded { session_id, reason } => {
                            if self.session_ended(session_id, reason) {
                                info!("Record cap reached, shutting down");
                                break;
                            }
                        }
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                else => {
                    info!("Command channel closed, shutting down");
                    break;
                }
            }
        }

        self.teardown();

        let _ = self.shutdown_tx.send(true);
        info!("Outage recorder shut down successfully");

        Ok(())
    }

    /// Start a recording session appending to `path`.
    #[track_caller]
    #[instrument(skip(self))]
    fn start_recording(&mut self, path: PathBuf, session_id: Uuid) -> AppResult<()> {
        if let RecordingState::Recording {
            session_id: current,
            ..
        } = &self.state
        {
            return Err(AppError::InvalidState {
                reason: format!("Session {} is already recording", current),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        validate_log_path(&path)?;

        let source: Arc<dyn EventSource> = self.hub.clone();
        let session =
            RecordingSession::new(source, Arc::clone(&self.clock), self.session_config.clone());

        let command_tx = self.command_tx.clone();
        session.set_stop_listener(move |reason| {
            if let Err(e) = command_tx.try_send(AppCommand::SessionEnded { session_id, reason }) {
                warn!(session_id = %session_id, error = %e, "Failed to report session end");
            }
        });

        session.start(&path)?;

        info!(session_id = %session_id, path = ?path, "Recording started");

        self.session = Some(session);
        self.state = RecordingState::Recording {
            started_at: Instant::now(),
            session_id,
            path,
        };

        Ok(())
    }

    /// Stops the current session, if any, for host teardown.
    #[instrument(skip(self))]
    fn teardown(&mut self) {
        let RecordingState::Recording {
            session_id,
            started_at,
            path,
        } = std::mem::replace(&mut self.state, RecordingState::Idle)
        else {
            debug!("No session to stop");
            return;
        };

        if let Some(session) = self.session.take() {
            session.stop_with(StopReason::HostTeardown);
        }

        info!(
            session_id = %session_id,
            path = ?path,
            duration_secs = started_at.elapsed().as_secs(),
            "Recording stopped"
        );
    }

    /// Handles a session closing on its own. Returns `true` when the host
    /// should tear down.
    #[instrument(skip(self))]
    fn session_ended(&mut self, session_id: Uuid, reason: StopReason) -> bool {
        let is_current = matches!(
            &self.state,
            RecordingState::Recording { session_id: current, .. } if *current == session_id
        );

        if !is_current {
            debug!(session_id = %session_id, ?reason, "Stale session end ignored");
            return false;
        }

        // Already closed; dropping the handle is a no-op stop.
        self.session = None;
        self.state = RecordingState::Idle;

        reason == StopReason::RecordCapReached
    }
}
