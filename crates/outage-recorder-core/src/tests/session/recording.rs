use super::{device, fixed_clock};
use crate::{
    CoreResult, EventKind, EventSource, MAX_RECORDS, Notification, NotificationHub,
    NotificationSink, RadioStatus, RecorderError, RecordingSession, SessionConfig, Status,
    StatusEvent, StopReason, SubscriptionId, Timestamp,
    session::NO_WIFI_NAME,
    source::{KEY_STATE, KEY_TRANSPORT},
};

use std::{
    panic::Location,
    path::Path,
    sync::{Arc, Mutex},
};

use error_location::ErrorLocation;

const HEADER_LINES: usize = 3;
const FOOTER_LINES: usize = 1;

fn session(hub: &Arc<NotificationHub>) -> RecordingSession {
    let source: Arc<dyn EventSource> = hub.clone();
    RecordingSession::new(
        source,
        Arc::new(fixed_clock()),
        SessionConfig::new(device()),
    )
}

fn radio(state: &str) -> Notification {
    Notification::new(EventKind::Radio).with(KEY_STATE, state)
}

#[allow(clippy::unwrap_used)]
fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// WHAT: Consecutive identical radio events produce one record
/// WHY: Bursts of identical notifications must not flood the log
#[test]
#[allow(clippy::unwrap_used)]
fn given_open_session_when_same_radio_state_repeated_then_one_record() {
    // Given: An open session
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start(&path).unwrap();

    // When: Radio enabled arrives three times
    for _ in 0..3 {
        hub.publish(radio("enabled"));
    }
    session.stop();

    // Then: Header, one record, footer
    let lines = read_lines(&path);
    assert_eq!(session.record_count(), 1);
    assert_eq!(lines.len(), HEADER_LINES + 1 + FOOTER_LINES);
    assert!(lines[HEADER_LINES].ends_with("Wifi enabled"));
}

/// WHAT: Alternating values are all recorded in arrival order
/// WHY: Every real state change must reach the log
#[test]
#[allow(clippy::unwrap_used)]
fn given_open_session_when_radio_alternates_then_three_records_in_order() {
    // Given: An open session
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start(&path).unwrap();

    // When: enabled, disabled, enabled
    hub.publish(radio("enabled"));
    hub.publish(radio("disabled"));
    hub.publish(radio("enabled"));
    session.stop();

    // Then: Three data lines in order
    let lines = read_lines(&path);
    let data = &lines[HEADER_LINES..lines.len() - FOOTER_LINES];
    assert_eq!(
        data,
        [
            "2020.01.01  00:00:00 Wifi enabled",
            "2020.01.01  00:00:00 Wifi disabled",
            "2020.01.01  00:00:00 Wifi enabled",
        ]
    );
}

/// WHAT: Log line count is header + accepted events + footer
/// WHY: The file layout is fixed and machine-checkable
#[test]
#[allow(clippy::unwrap_used)]
fn given_mixed_events_when_session_stops_then_line_count_matches_accepted_events() {
    // Given: An open session
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start(&path).unwrap();

    // When: 5 accepted events among duplicates on both kinds
    hub.publish(radio("enabled"));
    hub.publish(Notification::new(EventKind::Link).with(KEY_STATE, "disconnected"));
    hub.publish(radio("enabled"));
    hub.publish(Notification::new(EventKind::Link).with(KEY_STATE, "disconnected"));
    hub.publish(
        Notification::new(EventKind::Link)
            .with(KEY_STATE, "connected")
            .with(KEY_TRANSPORT, "mobile"),
    );
    hub.publish(radio("disabled"));
    hub.publish(Notification::new(EventKind::Link).with(KEY_STATE, "disconnected"));
    session.stop();

    // Then: 3 + 5 + 1 lines
    assert_eq!(session.record_count(), 5);
    assert_eq!(read_lines(&path).len(), HEADER_LINES + 5 + FOOTER_LINES);
}

/// WHAT: Connected Wi-Fi without metadata is logged with the fallback name and 0 MHz
/// WHY: Missing radio metadata must never blank a connectivity record
#[test]
#[allow(clippy::unwrap_used)]
fn given_wifi_link_without_metadata_when_recorded_then_fallback_fields() {
    // Given: An open session
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start(&path).unwrap();

    // When: A connected Wi-Fi event without SSID or frequency
    hub.publish(
        Notification::new(EventKind::Link)
            .with(KEY_STATE, "connected")
            .with(KEY_TRANSPORT, "wifi"),
    );
    session.stop();

    // Then: Fallback name and zero frequency are written
    let lines = read_lines(&path);
    assert_eq!(
        lines[HEADER_LINES],
        format!("2020.01.01  00:00:00 Internet connected via Wifi: {NO_WIFI_NAME} Freq(MHz): 0")
    );
}

/// WHAT: Stopping twice writes exactly one footer
/// WHY: Stop is reachable from user, host and cap paths at once
#[test]
#[allow(clippy::unwrap_used)]
fn given_open_session_when_stopped_twice_then_single_footer() {
    // Given: An open session with a stop listener
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    let reasons = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&reasons);
    session.set_stop_listener(move |reason| seen.lock().unwrap().push(reason));
    session.start(&path).unwrap();

    // When: Stopping twice
    session.stop();
    session.stop();

    // Then: One footer, one notification, no subscriptions left
    let footers = read_lines(&path)
        .iter()
        .filter(|l| l.ends_with("Recording stopped"))
        .count();
    assert_eq!(footers, 1);
    assert_eq!(*reasons.lock().unwrap(), vec![StopReason::Requested]);
    assert!(!session.is_open());
    assert_eq!(hub.subscriber_count(EventKind::Radio), 0);
    assert_eq!(hub.subscriber_count(EventKind::Link), 0);
}

/// WHAT: The session stops itself after MAX_RECORDS + 1 accepted events
/// WHY: The record cap bounds the log size and signals the host
#[test]
#[allow(clippy::unwrap_used)]
fn given_open_session_when_cap_exceeded_then_cap_line_footer_and_stop() {
    // Given: An open session with the default cap
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    let reasons = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&reasons);
    session.set_stop_listener(move |reason| seen.lock().unwrap().push(reason));
    session.start(&path).unwrap();

    // When: MAX_RECORDS + 1 accepted events, then more
    for i in 0..=MAX_RECORDS {
        hub.publish(radio(if i % 2 == 0 { "enabled" } else { "disabled" }));
    }
    let reached_after_stop = hub.publish(radio("enabled"));

    // Then: Data lines, one cap line, one footer; session closed
    let lines = read_lines(&path);
    let data_lines = (MAX_RECORDS + 1) as usize;
    assert_eq!(lines.len(), HEADER_LINES + data_lines + 1 + FOOTER_LINES);
    assert!(lines[lines.len() - 2].contains("Maximum number of records reached"));
    assert!(lines[lines.len() - 1].ends_with("Recording stopped"));
    assert!(!session.is_open());
    assert_eq!(reached_after_stop, 0);
    assert_eq!(*reasons.lock().unwrap(), vec![StopReason::RecordCapReached]);
}

/// WHAT: A small configured cap triggers after cap + 1 records
/// WHY: The cap is per-session configuration
#[test]
#[allow(clippy::unwrap_used)]
fn given_cap_of_two_when_three_changes_then_session_stops() {
    // Given: A session capped at 2 records
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let source: Arc<dyn EventSource> = hub.clone();
    let session = RecordingSession::new(
        source,
        Arc::new(fixed_clock()),
        SessionConfig::new(device()).with_max_records(2),
    );
    session.start(&path).unwrap();

    // When: Two changes, then a third
    hub.publish(radio("enabled"));
    hub.publish(radio("disabled"));
    assert!(session.is_open());
    hub.publish(radio("enabled"));

    // Then: Closed with 3 records
    assert!(!session.is_open());
    assert_eq!(session.record_count(), 3);
}

/// WHAT: Starting against an unwritable path fails and creates nothing
/// WHY: File-open failure is the only error surfaced to the host
#[test]
#[allow(clippy::unwrap_used)]
fn given_unwritable_path_when_starting_then_error_and_no_artifacts() {
    // Given: A path under a missing directory
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);

    // When: Starting
    let result = session.start(&path);

    // Then: FileOpen error, still closed, nothing subscribed or created
    assert!(matches!(result, Err(RecorderError::FileOpen { .. })));
    assert!(!session.is_open());
    assert!(!path.exists());
    assert_eq!(hub.subscriber_count(EventKind::Radio), 0);
}

/// WHAT: Starting an open session is rejected
/// WHY: A session owns exactly one file and one subscription per kind
#[test]
#[allow(clippy::unwrap_used)]
fn given_open_session_when_started_again_then_already_recording() {
    // Given: An open session
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start(&path).unwrap();

    // When: Starting again on another file
    let result = session.start(dir.path().join("other.log"));

    // Then: Rejected, original subscription untouched
    assert!(matches!(result, Err(RecorderError::AlreadyRecording { .. })));
    assert_eq!(session.target_file(), Some(path));
    assert_eq!(hub.subscriber_count(EventKind::Radio), 1);
    assert_eq!(hub.subscriber_count(EventKind::Link), 1);
}

/// WHAT: Events delivered while closed are dropped
/// WHY: Notifications may race with teardown
#[test]
#[allow(clippy::unwrap_used)]
fn given_closed_session_when_event_arrives_then_ignored() {
    // Given: A session that was started and stopped
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start(&path).unwrap();
    session.stop();
    let before = read_lines(&path);

    // When: An event is handed over directly
    session.on_event(StatusEvent::new(
        Status::Radio(RadioStatus::Enabled),
        Timestamp::new("2020.01.01", "00:00:01"),
    ));

    // Then: Nothing is written
    assert_eq!(read_lines(&path), before);
    assert_eq!(session.record_count(), 0);
}

/// WHAT: A stopped session can be restarted with fresh dedup state
/// WHY: The host may start recording again after a stop
#[test]
#[allow(clippy::unwrap_used)]
fn given_stopped_session_when_restarted_then_first_status_logged_again() {
    // Given: A session that recorded radio enabled and stopped
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start(&path).unwrap();
    hub.publish(radio("enabled"));
    session.stop();

    // When: Restarting and seeing the same status
    session.start(&path).unwrap();
    hub.publish(radio("enabled"));
    session.stop();

    // Then: Both sessions logged it, each framed by header and footer
    let lines = read_lines(&path);
    assert_eq!(lines.len(), 2 * (HEADER_LINES + 1 + FOOTER_LINES));
    assert_eq!(session.record_count(), 1);
}

/// WHAT: Dropping an open session writes the footer
/// WHY: Host teardown must close the log cleanly
#[test]
#[allow(clippy::unwrap_used)]
fn given_open_session_when_dropped_then_footer_written_and_unsubscribed() {
    // Given: An open session
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start(&path).unwrap();

    // When: Dropping it
    drop(session);

    // Then: Footer present, hub empty
    let lines = read_lines(&path);
    assert!(lines[lines.len() - 1].ends_with("Recording stopped"));
    assert_eq!(hub.subscriber_count(EventKind::Link), 0);
}

struct LinkRejectingSource {
    hub: NotificationHub,
}

impl EventSource for LinkRejectingSource {
    fn subscribe(&self, kind: EventKind, sink: NotificationSink) -> CoreResult<SubscriptionId> {
        if kind == EventKind::Link {
            return Err(RecorderError::Subscription {
                reason: "link notifications unavailable".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.hub.subscribe(kind, sink)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hub.unsubscribe(id)
    }
}

/// WHAT: A failed subscription rolls back the partial start
/// WHY: The session must never stay half-subscribed
#[test]
#[allow(clippy::unwrap_used)]
fn given_source_rejecting_link_when_starting_then_error_and_radio_unsubscribed() {
    // Given: A source that refuses link subscriptions and an earlier log
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    std::fs::write(&path, "earlier session\n").unwrap();
    let source = Arc::new(LinkRejectingSource {
        hub: NotificationHub::new(),
    });
    let dyn_source: Arc<dyn EventSource> = source.clone();
    let session = RecordingSession::new(
        dyn_source,
        Arc::new(fixed_clock()),
        SessionConfig::new(device()),
    );

    // When: Starting
    let result = session.start(&path);

    // Then: Subscription error, closed, radio subscription removed, log untouched
    assert!(matches!(result, Err(RecorderError::Subscription { .. })));
    assert!(!session.is_open());
    assert_eq!(source.hub.subscriber_count(EventKind::Radio), 0);
    assert_eq!(read_lines(&path), vec!["earlier session"]);
}

/// WHAT: A rejected subscription does not create the log file
/// WHY: A failed start must leave no partial header behind
#[test]
#[allow(clippy::unwrap_used)]
fn given_source_rejecting_link_when_starting_fresh_then_no_file_created() {
    // Given: A source that refuses link subscriptions and no log yet
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let source: Arc<dyn EventSource> = Arc::new(LinkRejectingSource {
        hub: NotificationHub::new(),
    });
    let session = RecordingSession::new(
        source,
        Arc::new(fixed_clock()),
        SessionConfig::new(device()),
    );

    // When: Starting
    let result = session.start(&path);

    // Then: No file was created
    assert!(result.is_err());
    assert!(!path.exists());
}

/// WHAT: A stop listener may replace itself while running
/// WHY: The listener slot must not be locked while the listener executes
#[test]
#[allow(clippy::unwrap_used)]
fn given_listener_replacing_itself_when_stopping_then_no_deadlock() {
    // Given: An open session whose listener installs a new listener
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = Arc::new(session(&hub));
    let calls = Arc::new(Mutex::new(Vec::new()));

    let weak = Arc::downgrade(&session);
    let seen = Arc::clone(&calls);
    session.set_stop_listener(move |reason| {
        seen.lock().unwrap().push(reason);
        if let Some(session) = weak.upgrade() {
            let seen = Arc::clone(&seen);
            session.set_stop_listener(move |reason| seen.lock().unwrap().push(reason));
        }
    });
    session.start(&path).unwrap();

    // When: Stopping, restarting and stopping again
    session.stop();
    session.start(&path).unwrap();
    session.stop_with(StopReason::HostTeardown);

    // Then: The first listener ran once, its replacement ran for the second stop
    assert_eq!(
        *calls.lock().unwrap(),
        vec![StopReason::Requested, StopReason::HostTeardown]
    );
}

/// WHAT: Concurrent radio and link publishers racing a stop leave a well-formed log
/// WHY: Events arrive on independent channels and stop may come from another thread
#[test]
#[allow(clippy::unwrap_used)]
fn given_concurrent_publishers_when_stop_races_then_single_footer_last() {
    // Given: An open session and two publisher threads
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("outages.log");
    let hub = Arc::new(NotificationHub::new());
    let session = Arc::new(session(&hub));
    session.start(&path).unwrap();

    let mut handles = vec![];
    for kind in [EventKind::Radio, EventKind::Link] {
        let hub = Arc::clone(&hub);
        handles.push(std::thread::spawn(move || {
            for i in 0..500 {
                let state = match (kind, i % 2 == 0) {
                    (EventKind::Radio, true) => "enabled",
                    (EventKind::Radio, false) => "disabled",
                    (EventKind::Link, true) => "connected",
                    (EventKind::Link, false) => "disconnected",
                };
                hub.publish(Notification::new(kind).with(KEY_STATE, state));
            }
        }));
    }

    // When: Stopping while publishers run
    let stopper = {
        let session = Arc::clone(&session);
        std::thread::spawn(move || session.stop())
    };
    for h in handles {
        h.join().unwrap();
    }
    stopper.join().unwrap();
    session.stop();

    // Then: Exactly one footer and it is the last line
    let lines = read_lines(&path);
    let footers = lines
        .iter()
        .filter(|l| l.ends_with("Recording stopped"))
        .count();
    assert_eq!(footers, 1);
    assert!(lines[lines.len() - 1].ends_with("Recording stopped"));
    assert_eq!(
        lines.len(),
        HEADER_LINES + session.record_count() as usize + FOOTER_LINES
    );
}

/// WHAT: Write failures do not end the session
/// WHY: Losing a record is preferable to aborting a healthy monitoring session
#[test]
#[cfg(target_os = "linux")]
#[allow(clippy::unwrap_used)]
fn given_full_device_when_recording_then_session_keeps_running() {
    // Given: A session writing to a device that rejects every write
    let hub = Arc::new(NotificationHub::new());
    let session = session(&hub);
    session.start("/dev/full").unwrap();

    // When: Status changes arrive
    hub.publish(radio("enabled"));
    hub.publish(radio("disabled"));

    // Then: Records are still counted and stop succeeds
    assert!(session.is_open());
    assert_eq!(session.record_count(), 2);
    session.stop();
    assert!(!session.is_open());
}
