// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of MATE HOME.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Time-range tokens and timestamp helpers
//!
//! The fixed ranges ("1h", "6h", "24h") are plain durations. "today" is a
//! different rule: it starts at local midnight, so its length depends on the
//! moment it is evaluated and it never goes through [`range_to_ms`].

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Duration, Local, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};

use crate::history::TimeWindow;

pub const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Milliseconds covered by a fixed range token
///
/// Unknown tokens, "today" included, fall back to one hour.
pub fn range_to_ms(token: &str) -> i64 {
    match token {
        "6h" => 6 * MS_PER_HOUR,
        "24h" => 24 * MS_PER_HOUR,
        _ => MS_PER_HOUR,
    }
}

/// Local midnight of the day `now` falls on
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        // midnight skipped by a DST jump, fall back to plain subtraction
        .unwrap_or_else(|| {
            now.clone() - Duration::seconds(i64::from(now.num_seconds_from_midnight()))
        })
}

/// Milliseconds elapsed since local midnight
pub fn millis_since_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    now.clone()
        .signed_duration_since(start_of_day(now))
        .num_milliseconds()
}

/// Range selectable in the device detail view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    #[default]
    OneHour,
    SixHours,
    TwentyFourHours,
    Today,
}

impl TimeRange {
    pub const ALL: [Self; 4] = [
        Self::OneHour,
        Self::SixHours,
        Self::TwentyFourHours,
        Self::Today,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::TwentyFourHours => "24h",
            Self::Today => "today",
        }
    }

    /// Fixed duration, `None` for "today"
    pub fn duration(self) -> Option<Duration> {
        match self {
            Self::OneHour | Self::SixHours | Self::TwentyFourHours => {
                Some(Duration::milliseconds(range_to_ms(self.as_str())))
            }
            Self::Today => None,
        }
    }

    /// First instant covered by the range when evaluated at `now`
    pub fn start_at<Tz: TimeZone>(self, now: &DateTime<Tz>) -> DateTime<Tz> {
        match self.duration() {
            Some(duration) => now.clone() - duration,
            None => start_of_day(now),
        }
    }

    /// Milliseconds covered when evaluated at `now`
    pub fn span_ms<Tz: TimeZone>(self, now: &DateTime<Tz>) -> i64 {
        match self {
            Self::Today => millis_since_midnight(now),
            Self::OneHour | Self::SixHours | Self::TwentyFourHours => range_to_ms(self.as_str()),
        }
    }

    /// Aggregation window requested from the backend for this range
    pub fn window(self) -> TimeWindow {
        match self {
            Self::OneHour => TimeWindow::OneHour,
            Self::SixHours => TimeWindow::SixHours,
            Self::TwentyFourHours | Self::Today => TimeWindow::TwentyFourHours,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|range| range.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown time range '{s}'"))
    }
}

/// Parse a backend timestamp
///
/// Accepts RFC 3339 and offset-less ISO-8601 date-times (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// 24-hour `HH:MM:SS` rendering, display only
pub fn format_clock_time<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    timestamp.format("%H:%M:%S").to_string()
}

/// [`format_clock_time`] in the machine's local zone
pub fn format_local_clock_time(timestamp: DateTime<Utc>) -> String {
    format_clock_time(&timestamp.with_timezone(&Local))
}
