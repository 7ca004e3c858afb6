use crate::session::COLUMN_WIDTH;

use std::fmt;

use chrono::{DateTime, Local, TimeZone};

const DATE_FORMAT: &str = "%Y.%m.%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Wall-clock time split into the Date and Time log columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    date: String,
    time: String,
}

impl Timestamp {
    /// Builds a timestamp from already formatted date and time columns.
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }

    /// Formats a chrono date-time into log columns.
    pub fn from_datetime<Tz>(at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            date: at.format(DATE_FORMAT).to_string(),
            time: at.format(TIME_FORMAT).to_string(),
        }
    }

    /// Date column, e.g. `2020.01.01`.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Time column, e.g. `00:00:00`.
    pub fn time(&self) -> &str {
        &self.time
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<width$}{}", self.date, self.time, width = COLUMN_WIDTH)
    }
}

/// Source of record timestamps.
pub trait Clock: Send + Sync {
    /// Current time as log columns.
    fn now(&self) -> Timestamp;
}

/// Local wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(&Local::now())
    }
}

/// Clock that always reports the same instant. Used for replays and tests.
#[derive(Debug, Clone)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    /// Creates a clock frozen at `at`.
    pub fn new(at: Timestamp) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0.clone()
    }
}
