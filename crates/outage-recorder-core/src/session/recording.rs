use crate::{
    Clock, CoreResult, DeviceInfo, EventKind, EventSource, LogRecord, LogWriter, Notification,
    NotificationSink, RecorderError, StatusDeduplicator, StatusEvent, SubscriptionId,
    source::translate,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, trace, warn};

/// Records written before a session stops itself.
///
/// Limits the log to roughly 1MB at ~100 bytes per record.
pub const MAX_RECORDS: u64 = 10_000;

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Accepted records after which the session stops itself.
    pub max_records: u64,
    /// Device described in the header.
    pub device: DeviceInfo,
}

impl SessionConfig {
    /// Default cap for `device`.
    pub fn new(device: DeviceInfo) -> Self {
        Self {
            max_records: MAX_RECORDS,
            device,
        }
    }

    /// Overrides the record cap.
    pub fn with_max_records(mut self, max_records: u64) -> Self {
        self.max_records = max_records;
        self
    }
}

/// Why a session went from Open to Closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Explicit stop by the user or host.
    Requested,
    /// The record cap was exceeded.
    RecordCapReached,
    /// The host is shutting down.
    HostTeardown,
}

type StopListener = Arc<dyn Fn(StopReason) + Send + Sync>;

#[derive(Default)]
struct SessionState {
    /// `Some` exactly while the session is Open.
    log: Option<LogWriter>,
    subscriptions: Vec<SubscriptionId>,
    record_count: u64,
    dedup: StatusDeduplicator,
}

struct Shared {
    state: Mutex<SessionState>,
    source: Arc<dyn EventSource>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    stop_listener: Mutex<Option<StopListener>>,
}

/// A monitoring session bound to one log file.
///
/// All event handling and stopping is serialized on one lock, so radio and
/// link notifications may arrive concurrently from different threads.
/// Dropping an open session stops it with [`StopReason::HostTeardown`].
pub struct RecordingSession {
    shared: Arc<Shared>,
}

impl RecordingSession {
    /// Creates a closed session that will subscribe to `source` on start.
    pub fn new(source: Arc<dyn EventSource>, clock: Arc<dyn Clock>, config: SessionConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::default()),
                source,
                clock,
                config,
                stop_listener: Mutex::new(None),
            }),
        }
    }

    /// Registers a callback run once per Open to Closed transition.
    ///
    /// The callback runs outside the session lock, on whichever thread
    /// stopped the session.
    pub fn set_stop_listener(&self, listener: impl Fn(StopReason) + Send + Sync + 'static) {
        *lock_recovering(&self.shared.stop_listener) = Some(Arc::new(listener));
    }

    /// Subscribes to both event kinds, then opens `path` and writes the header.
    ///
    /// # Errors
    ///
    /// Fails if the session is already open, the event source rejects a
    /// subscription, or the file cannot be opened for append. The session
    /// stays closed and the file untouched in every failure case.
    #[track_caller]
    #[instrument(skip(self, path), fields(path = ?path.as_ref()))]
    pub fn start(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let shared = &self.shared;
        let mut state = shared.lock_state();

        if let Some(log) = &state.log {
            return Err(RecorderError::AlreadyRecording {
                path: log.path().to_path_buf(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // A failed start must not touch the log. Sinks block on the state
        // lock until the log is in place.
        let mut subscriptions = Vec::with_capacity(2);
        for kind in [EventKind::Radio, EventKind::Link] {
            match shared.source.subscribe(kind, Shared::sink(shared)) {
                Ok(id) => subscriptions.push(id),
                Err(e) => {
                    shared.unsubscribe_all(subscriptions);
                    error!(error = ?e, ?kind, "Subscription failed");
                    return Err(e);
                }
            }
        }

        let mut log = match LogWriter::open(path) {
            Ok(log) => log,
            Err(e) => {
                shared.unsubscribe_all(subscriptions);
                return Err(e);
            }
        };

        // Header loss is not fatal; the session can still record changes.
        if let Err(e) = log.append_header(&shared.config.device, &shared.clock.now()) {
            warn!(error = ?e, "Failed to write log header");
        }

        state.dedup.reset();
        state.record_count = 0;
        state.subscriptions = subscriptions;
        state.log = Some(log);

        info!(max_records = shared.config.max_records, "Recording started");

        Ok(())
    }

    /// Stops a user- or host-requested session. No-op when closed.
    pub fn stop(&self) {
        self.stop_with(StopReason::Requested);
    }

    /// Stops the session for `reason`. No-op when closed.
    ///
    /// Footer write failures are logged, not returned.
    #[instrument(skip(self))]
    pub fn stop_with(&self, reason: StopReason) {
        let stopped = {
            let mut state = self.shared.lock_state();
            self.shared.close(&mut state, reason)
        };

        match stopped {
            Some(reason) => self.shared.notify_stopped(reason),
            None => debug!("Stop ignored, session not recording"),
        }
    }

    /// Handles one status change. Ignored while closed.
    pub fn on_event(&self, event: StatusEvent) {
        self.shared.on_event(event);
    }

    /// Whether the log file is open.
    pub fn is_open(&self) -> bool {
        self.shared.lock_state().log.is_some()
    }

    /// Records accepted since the last start.
    pub fn record_count(&self) -> u64 {
        self.shared.lock_state().record_count
    }

    /// File the open session writes to.
    pub fn target_file(&self) -> Option<PathBuf> {
        self.shared
            .lock_state()
            .log
            .as_ref()
            .map(|log| log.path().to_path_buf())
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.stop_with(StopReason::HostTeardown);
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        lock_recovering(&self.state)
    }

    /// Sink handed to the event source. Holds only a weak reference so a
    /// leaked subscription cannot keep the session alive.
    fn sink(shared: &Arc<Shared>) -> NotificationSink {
        let weak: Weak<Shared> = Arc::downgrade(shared);
        Arc::new(move |notification: Notification| {
            if let Some(shared) = weak.upgrade() {
                let event = translate(&notification, shared.clock.as_ref());
                shared.on_event(event);
            }
        })
    }

    fn on_event(&self, event: StatusEvent) {
        let stopped = {
            let mut state = self.lock_state();
            let SessionState {
                log,
                record_count,
                dedup,
                ..
            } = &mut *state;

            let Some(log) = log.as_mut() else {
                debug!(kind = ?event.kind(), "Event dropped, session closed");
                return;
            };

            if !dedup.should_emit(&event.status) {
                trace!(kind = ?event.kind(), "Duplicate status suppressed");
                return;
            }

            let record = LogRecord::from(event);
            if let Err(e) = log.append_record(&record) {
                warn!(error = ?e, "Failed to write log record");
            }
            *record_count += 1;

            if *record_count > self.config.max_records {
                warn!(records = *record_count, "Record cap exceeded, stopping");
                if let Err(e) = log.append_max_records_reached(&self.clock.now()) {
                    warn!(error = ?e, "Failed to write record cap line");
                }
                self.close(&mut state, StopReason::RecordCapReached)
            } else {
                None
            }
        };

        if let Some(reason) = stopped {
            self.notify_stopped(reason);
        }
    }

    /// Writes the footer, unsubscribes and closes. Returns `None` if the
    /// session was already closed.
    fn close(&self, state: &mut SessionState, reason: StopReason) -> Option<StopReason> {
        let log = state.log.take()?;
        let path = log.path().to_path_buf();

        if let Err(e) = log.finish(&self.clock.now()) {
            warn!(error = ?e, "Failed to write log footer");
        }

        self.unsubscribe_all(std::mem::take(&mut state.subscriptions));

        info!(
            path = ?path,
            records = state.record_count,
            reason = ?reason,
            "Recording stopped"
        );

        Some(reason)
    }

    fn unsubscribe_all(&self, subscriptions: Vec<SubscriptionId>) {
        for id in subscriptions {
            self.source.unsubscribe(id);
        }
    }

    /// Runs the listener after releasing its slot, so it may replace itself.
    fn notify_stopped(&self, reason: StopReason) {
        let listener = lock_recovering(&self.stop_listener).clone();
        if let Some(listener) = listener {
            listener(reason);
        }
    }
}

/// Session data stays valid if a holder panicked mid-event.
fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| {
        error!("Session lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}
