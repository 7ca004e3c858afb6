//! Connectivity status values carried by host notifications.

use crate::Timestamp;

/// The two notification channels the recorder listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Wi-Fi radio switched on or off.
    Radio,
    /// Network link came up or went down.
    Link,
}

/// Wi-Fi radio state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioStatus {
    /// Radio is on.
    Enabled,
    /// Radio is off.
    Disabled,
    /// State missing or not recognised.
    Unknown,
}

/// A piece of radio metadata the host may not be able to supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading<T> {
    /// Value reported by the host.
    Available(T),
    /// Host could not report the value.
    Unavailable,
}

impl<T> Reading<T> {
    /// Returns the reading, or `fallback` when unavailable.
    pub fn unwrap_or(self, fallback: T) -> T {
        match self {
            Reading::Available(value) => value,
            Reading::Unavailable => fallback,
        }
    }

    /// Whether the host supplied a value.
    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Available(_))
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Reading::Unavailable, Reading::Available)
    }
}

/// Details of the Wi-Fi network carrying the active link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiDetails {
    /// Network name.
    pub ssid: Reading<String>,
    /// Channel frequency in MHz.
    pub frequency_mhz: Reading<u32>,
}

impl WifiDetails {
    /// Details for a Wi-Fi link whose metadata could not be read.
    pub fn unavailable() -> Self {
        Self {
            ssid: Reading::Unavailable,
            frequency_mhz: Reading::Unavailable,
        }
    }
}

/// Transport carrying a connected link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Wi-Fi, with network metadata.
    Wifi(WifiDetails),
    /// Cellular data.
    Mobile,
    /// Bluetooth tethering.
    Bluetooth,
    /// Wired ethernet.
    Ethernet,
    /// Transport not reported.
    Unknown,
}

/// Network link state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Link is up over the given transport.
    Connected(Transport),
    /// Link is down.
    Disconnected,
    /// State missing or not recognised.
    Unknown,
}

/// A status value of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Radio state.
    Radio(RadioStatus),
    /// Link state.
    Link(LinkStatus),
}

impl Status {
    /// Channel this status belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Status::Radio(_) => EventKind::Radio,
            Status::Link(_) => EventKind::Link,
        }
    }
}

/// A state change observed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    /// New status.
    pub status: Status,
    /// When the host observed it.
    pub observed_at: Timestamp,
}

impl StatusEvent {
    /// Creates an event observed at `observed_at`.
    pub fn new(status: Status, observed_at: Timestamp) -> Self {
        Self {
            status,
            observed_at,
        }
    }

    /// Channel the event arrived on.
    pub fn kind(&self) -> EventKind {
        self.status.kind()
    }
}
