//! Calendar dates in the `DD/MM/YYYY` display format and deadline arithmetic
//!
//! Every deadline in the system is a calendar date. Day counts are whole-day
//! differences between calendar dates, so a deadline later today is `0` days
//! away and a deadline tomorrow is `1` day away.

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Display format used for every date in the system
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Warning window (inclusive) for investigation and detention deadlines
pub const WARNING_WINDOW_DAYS: i64 = 15;

/// Error returned when a string is not a valid `DD/MM/YYYY` date
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid date '{input}': expected DD/MM/YYYY")]
pub struct DateParseError {
    pub input: String,
}

/// A calendar date rendered as `DD/MM/YYYY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayDate(NaiveDate);

impl DisplayDate {
    /// Wrap a calendar date
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from day, month, year; `None` if the date does not exist
    pub fn from_dmy(day: u32, month: u32, year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// ISO `YYYY-MM-DD` form, used for export file names
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl From<NaiveDate> for DisplayDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl std::fmt::Display for DisplayDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DISPLAY_FORMAT))
    }
}

impl std::str::FromStr for DisplayDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || DateParseError {
            input: s.to_string(),
        };

        let mut parts = trimmed.split('/');
        let (Some(d), Some(m), Some(y), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };

        // Years must be written in full so "1/2/25" is not silently year 25
        if y.len() != 4 {
            return Err(err());
        }

        let day: u32 = d.parse().map_err(|_| err())?;
        let month: u32 = m.parse().map_err(|_| err())?;
        let year: i32 = y.parse().map_err(|_| err())?;

        Self::from_dmy(day, month, year).ok_or_else(err)
    }
}

impl Serialize for DisplayDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DisplayDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Source of "today"
pub trait Clock {
    fn today(&self) -> DisplayDate;
}

/// Clock backed by the local system calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DisplayDate {
        DisplayDate(Local::now().date_naive())
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DisplayDate);

impl Clock for FixedClock {
    fn today(&self) -> DisplayDate {
        self.0
    }
}

/// Current date according to the given clock
pub fn today(clock: &dyn Clock) -> DisplayDate {
    clock.today()
}

/// Signed number of days from `from` to `to`
pub fn days_between(from: DisplayDate, to: DisplayDate) -> i64 {
    (to.0 - from.0).num_days()
}

/// Signed number of days left until `deadline` (negative once it has passed)
pub fn days_remaining(deadline: DisplayDate, today: DisplayDate) -> i64 {
    days_between(today, deadline)
}

/// True when `deadline` is at most [`WARNING_WINDOW_DAYS`] away, including past deadlines
pub fn is_expiring_soon(deadline: DisplayDate, today: DisplayDate) -> bool {
    days_remaining(deadline, today) <= WARNING_WINDOW_DAYS
}

/// The date `n` days after `date` (`n` may be negative)
///
/// Saturates at the calendar bounds instead of panicking.
pub fn add_days(date: DisplayDate, n: i64) -> DisplayDate {
    let shifted = if n >= 0 {
        date.0.checked_add_days(Days::new(n.unsigned_abs()))
    } else {
        date.0.checked_sub_days(Days::new(n.unsigned_abs()))
    };
    match shifted {
        Some(d) => DisplayDate(d),
        None if n >= 0 => DisplayDate(NaiveDate::MAX),
        None => DisplayDate(NaiveDate::MIN),
    }
}
