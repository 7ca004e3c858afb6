//! Host notification plumbing.
//!
//! Hosts deliver raw [`Notification`] payloads through an [`EventSource`].
//! [`translate`] turns a payload into a [`StatusEvent`], mapping anything
//! missing or malformed to an unknown status instead of failing.

use crate::{
    Clock, CoreResult, EventKind, LinkStatus, RadioStatus, Reading, Status, StatusEvent,
    Transport, WifiDetails,
};

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::{debug, error, trace};

/// Payload key for the radio or link state.
pub const KEY_STATE: &str = "state";
/// Payload key for the link transport.
pub const KEY_TRANSPORT: &str = "transport";
/// Payload key for the Wi-Fi network name.
pub const KEY_SSID: &str = "ssid";
/// Payload key for the Wi-Fi frequency in MHz.
pub const KEY_FREQUENCY: &str = "frequency";

/// Raw notification as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Channel the notification was broadcast on.
    pub kind: EventKind,
    /// Loosely typed fields, see the `KEY_*` constants.
    pub payload: BTreeMap<String, String>,
}

impl Notification {
    /// Empty notification on `kind`.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            payload: BTreeMap::new(),
        }
    }

    /// Adds a payload field.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.payload
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Translates a host payload into a status event stamped by `clock`.
pub fn translate(notification: &Notification, clock: &dyn Clock) -> StatusEvent {
    let status = match notification.kind {
        EventKind::Radio => Status::Radio(radio_status(notification)),
        EventKind::Link => Status::Link(link_status(notification)),
    };

    StatusEvent::new(status, clock.now())
}

fn radio_status(notification: &Notification) -> RadioStatus {
    match notification.field(KEY_STATE).map(str::to_ascii_lowercase).as_deref() {
        Some("enabled") => RadioStatus::Enabled,
        Some("disabled") => RadioStatus::Disabled,
        other => {
            debug!(state = ?other, "Unrecognised radio state");
            RadioStatus::Unknown
        }
    }
}

fn link_status(notification: &Notification) -> LinkStatus {
    match notification.field(KEY_STATE).map(str::to_ascii_lowercase).as_deref() {
        Some("connected") => LinkStatus::Connected(transport(notification)),
        Some("disconnected") => LinkStatus::Disconnected,
        other => {
            debug!(state = ?other, "Unrecognised link state");
            LinkStatus::Unknown
        }
    }
}

fn transport(notification: &Notification) -> Transport {
    match notification
        .field(KEY_TRANSPORT)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("wifi") => Transport::Wifi(WifiDetails {
            ssid: notification
                .field(KEY_SSID)
                .map(|s| s.trim_matches('"').to_string())
                .filter(|s| !s.is_empty())
                .into(),
            frequency_mhz: notification
                .field(KEY_FREQUENCY)
                .and_then(|f| f.parse::<u32>().ok())
                .into(),
        }),
        Some("mobile") => Transport::Mobile,
        Some("bluetooth") => Transport::Bluetooth,
        Some("ethernet") => Transport::Ethernet,
        _ => Transport::Unknown,
    }
}

/// Identifies one registered sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback a source invokes for every notification of the subscribed kind.
pub type NotificationSink = Arc<dyn Fn(Notification) + Send + Sync>;

/// Host mechanism delivering radio and link notifications.
pub trait EventSource: Send + Sync {
    /// Registers `sink` for notifications of `kind`.
    fn subscribe(&self, kind: EventKind, sink: NotificationSink) -> CoreResult<SubscriptionId>;

    /// Removes a registration. Returns `false` if `id` was not registered.
    ///
    /// Must never fail: teardown paths may unsubscribe more than once.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// In-process [`EventSource`] that hosts publish notifications into.
#[derive(Default)]
pub struct NotificationHub {
    next_id: AtomicU64,
    sinks: Mutex<HashMap<SubscriptionId, (EventKind, NotificationSink)>>,
}

impl NotificationHub {
    /// Creates a hub with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `notification` to every sink subscribed to its kind.
    ///
    /// Sinks run outside the registry lock, so a sink may unsubscribe
    /// itself. Returns the number of sinks reached.
    pub fn publish(&self, notification: Notification) -> usize {
        let targets: Vec<NotificationSink> = self
            .lock_sinks()
            .values()
            .filter(|(kind, _)| *kind == notification.kind)
            .map(|(_, sink)| Arc::clone(sink))
            .collect();

        trace!(kind = ?notification.kind, sinks = targets.len(), "Publishing notification");

        for sink in &targets {
            sink(notification.clone());
        }

        targets.len()
    }

    /// Number of live subscriptions for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.lock_sinks()
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    fn lock_sinks(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<SubscriptionId, (EventKind, NotificationSink)>> {
        // The map stays consistent even if a holder panicked.
        self.sinks.lock().unwrap_or_else(|e| {
            error!("Subscriber registry lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl EventSource for NotificationHub {
    fn subscribe(&self, kind: EventKind, sink: NotificationSink) -> CoreResult<SubscriptionId> {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_sinks().insert(id, (kind, sink));
        debug!(?id, ?kind, "Subscribed");
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock_sinks().remove(&id).is_some();
        if removed {
            debug!(?id, "Unsubscribed");
        } else {
            debug!(?id, "Unsubscribe ignored, not registered");
        }
        removed
    }
}
