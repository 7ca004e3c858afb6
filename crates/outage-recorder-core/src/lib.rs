//! Outage Recorder Core Library
//!
//! Watches radio and link state notifications and keeps an append-only,
//! deduplicated log of connectivity changes.
//!
//! # Example
//!
//! ```no_run
//! use outage_recorder_core::{
//!     CoreResult, DeviceInfo, EventKind, Notification, NotificationHub, RecordingSession,
//!     SessionConfig, SystemClock,
//! };
//!
//! use std::sync::Arc;
//!
//! fn main() -> CoreResult<()> {
//!     let hub = Arc::new(NotificationHub::new());
//!     let config = SessionConfig::new(DeviceInfo::new("ThinkPad X1", "6.8.0"));
//!     let session = RecordingSession::new(hub.clone(), Arc::new(SystemClock), config);
//!
//!     session.start("outages.log")?;
//!     hub.publish(Notification::new(EventKind::Radio).with("state", "enabled"));
//!     session.stop();
//!     Ok(())
//! }
//! ```

mod clock;
mod error;
pub mod session;
pub mod source;
mod status;

pub use {
    clock::{Clock, FixedClock, SystemClock, Timestamp},
    error::RecorderError,
    error::Result as CoreResult,
    session::{
        DeviceInfo, LogRecord, LogWriter, MAX_RECORDS, RecordingSession, SessionConfig,
        StatusDeduplicator, StopReason,
    },
    source::{EventSource, Notification, NotificationHub, NotificationSink, SubscriptionId},
    status::{
        EventKind, LinkStatus, RadioStatus, Reading, Status, StatusEvent, Transport, WifiDetails,
    },
};
