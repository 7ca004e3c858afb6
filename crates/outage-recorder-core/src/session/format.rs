//! Log file line layout.
//!
//! The file is plain text with fixed-width, space padded columns so it can
//! be imported into a spreadsheet without a delimiter:
//!
//! ```text
//! ThinkPadX1 OS Version: 6.8.0
//! 2020.01.01  00:00:00 Recording started
//! Date        Time        SSID        Frequency   Status
//! 2020.01.01  00:00:05 Wifi enabled
//! 2020.01.01  00:00:07 Internet connected via Wifi: home Freq(MHz): 2412
//! 2020.01.01  01:00:00 Recording stopped
//! ```

use crate::{
    LinkStatus, RadioStatus, Reading, Status, StatusEvent, Timestamp, Transport, WifiDetails,
};

use std::fmt;

/// Width every padded column is left-aligned to.
pub const COLUMN_WIDTH: usize = 12;

pub(crate) const PLATFORM_VERSION_LABEL: &str = "OS Version";
pub(crate) const START_LABEL: &str = "Recording started";
pub(crate) const STOP_LABEL: &str = "Recording stopped";
pub(crate) const MAX_RECORDS_LABEL: &str = "Maximum number of records reached, recording stopped";

/// SSID written when a Wi-Fi link reports no network name.
pub const NO_WIFI_NAME: &str = "NoWifiName";

const COLUMN_TITLES: [&str; 5] = ["Date", "Time", "SSID", "Frequency", "Status"];

/// Device description written at the top of every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Hardware model.
    pub model: String,
    /// Operating system version.
    pub platform_version: String,
}

impl DeviceInfo {
    /// Describes a device.
    pub fn new(model: impl Into<String>, platform_version: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            platform_version: platform_version.into(),
        }
    }
}

/// One status change as written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// When the change was observed.
    pub timestamp: Timestamp,
    /// The new status.
    pub status: Status,
}

impl From<StatusEvent> for LogRecord {
    fn from(event: StatusEvent) -> Self {
        Self {
            timestamp: event.observed_at,
            status: event.status,
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.timestamp)?;
        match &self.status {
            Status::Radio(radio) => f.write_str(radio_label(*radio)),
            Status::Link(LinkStatus::Connected(transport)) => {
                write!(f, "Internet connected {}", transport_label(transport))?;
                if let Transport::Wifi(details) = transport {
                    write_wifi_details(f, details)?;
                }
                Ok(())
            }
            Status::Link(LinkStatus::Disconnected) => f.write_str("Internet disconnected"),
            Status::Link(LinkStatus::Unknown) => f.write_str("Internet status unknown"),
        }
    }
}

fn radio_label(status: RadioStatus) -> &'static str {
    match status {
        RadioStatus::Enabled => "Wifi enabled",
        RadioStatus::Disabled => "Wifi disabled",
        RadioStatus::Unknown => "Wifi status unknown",
    }
}

fn transport_label(transport: &Transport) -> &'static str {
    match transport {
        Transport::Wifi(_) => "via Wifi",
        Transport::Mobile => "via Mobile data",
        Transport::Bluetooth => "via Bluetooth",
        Transport::Ethernet => "via Ethernet",
        Transport::Unknown => "via unknown network",
    }
}

fn write_wifi_details(f: &mut fmt::Formatter<'_>, details: &WifiDetails) -> fmt::Result {
    let ssid = match &details.ssid {
        Reading::Available(name) => name.as_str(),
        Reading::Unavailable => NO_WIFI_NAME,
    };
    let frequency = details.frequency_mhz.clone().unwrap_or(0);
    write!(f, ": {ssid} Freq(MHz): {frequency}")
}

/// Header written once when a session starts.
pub fn header(device: &DeviceInfo, started_at: &Timestamp) -> String {
    let model: String = device
        .model
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    format!(
        "{model} {PLATFORM_VERSION_LABEL}: {}\n{started_at} {START_LABEL}\n{}\n",
        device.platform_version,
        column_titles()
    )
}

/// Data line for one accepted status change.
pub fn record(record: &LogRecord) -> String {
    format!("{record}\n")
}

/// Terminal line written when the record cap is exceeded.
pub fn max_records_reached(at: &Timestamp) -> String {
    format!("{at} {MAX_RECORDS_LABEL}\n")
}

/// Footer written once when a session stops.
pub fn footer(stopped_at: &Timestamp) -> String {
    format!("{stopped_at} {STOP_LABEL}\n")
}

fn column_titles() -> String {
    let last = COLUMN_TITLES.len() - 1;
    COLUMN_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| {
            if i == last {
                (*title).to_string()
            } else {
                format!("{title:<width$}", width = COLUMN_WIDTH)
            }
        })
        .collect()
}
