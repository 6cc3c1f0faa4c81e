//! Calendar date value used by project date ranges.
//!
//! # Invariants
//! - Wire format is `YYYY-MM-DD`; a trailing time part is accepted on
//!   input and dropped.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParseError(String);

impl Display for DateParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid calendar date `{}`", self.0)
    }
}

impl Error for DateParseError {}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// UTC calendar date of an epoch-milliseconds instant. Out-of-range
    /// instants map to the epoch.
    pub fn from_epoch_ms(epoch_ms: i64) -> Self {
        let instant: DateTime<Utc> = DateTime::from_timestamp_millis(epoch_ms).unwrap_or_default();
        Self(instant.date_naive())
    }
}

impl FromStr for CalendarDate {
    type Err = DateParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let date_part = trimmed
            .split_once(|c: char| c == 'T' || c == ' ')
            .map_or(trimmed, |(date, _)| date);
        date_part
            .parse::<NaiveDate>()
            .map(Self)
            .map_err(|_| DateParseError(trimmed.to_string()))
    }
}

impl Display for CalendarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
