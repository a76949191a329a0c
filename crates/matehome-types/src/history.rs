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

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::time::parse_timestamp;

/// Rejected history query, raised before any request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Device ID is required")]
    MissingDeviceId,

    #[error("Invalid {field} timestamp '{value}', expected ISO-8601")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("History range starts after it ends ({start} > {end})")]
    InvertedRange { start: String, end: String },

    #[error("Unknown history window '{0}', expected one of 1h, 6h, 24h")]
    UnknownWindow(String),
}

/// Aggregation window of a history request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    TwentyFourHours,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::TwentyFourHours => "24h",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1h" => Ok(Self::OneHour),
            "6h" => Ok(Self::SixHours),
            "24h" => Ok(Self::TwentyFourHours),
            other => Err(QueryError::UnknownWindow(other.to_owned())),
        }
    }
}

/// Validated parameters of a history fetch
///
/// `start <= end` always holds; both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    device_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    window: TimeWindow,
}

impl HistoryQuery {
    pub fn new(
        device_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        window: Option<TimeWindow>,
    ) -> Result<Self, QueryError> {
        let device_id = device_id.into();
        if device_id.trim().is_empty() {
            return Err(QueryError::MissingDeviceId);
        }
        if start > end {
            return Err(QueryError::InvertedRange {
                start: to_iso(start),
                end: to_iso(end),
            });
        }

        Ok(Self {
            device_id,
            start,
            end,
            window: window.unwrap_or_default(),
        })
    }

    /// Build a query from caller-supplied strings
    pub fn parse(
        device_id: Option<&str>,
        start: &str,
        end: &str,
        window: Option<&str>,
    ) -> Result<Self, QueryError> {
        let device_id = device_id.ok_or(QueryError::MissingDeviceId)?;
        let start = parse_bound("start", start)?;
        let end = parse_bound("end", end)?;
        let window = window.map(str::parse::<TimeWindow>).transpose()?;
        Self::new(device_id, start, end, window)
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// `start`, `end` and `window` query parameters
    pub fn query_params(&self) -> [(&'static str, String); 3] {
        [
            ("start", to_iso(self.start)),
            ("end", to_iso(self.end)),
            ("window", self.window.as_str().to_owned()),
        ]
    }
}

fn parse_bound(field: &'static str, value: &str) -> Result<DateTime<Utc>, QueryError> {
    parse_timestamp(value).ok_or_else(|| QueryError::InvalidTimestamp {
        field,
        value: value.to_owned(),
    })
}

/// Canonical ISO-8601 rendering used on the wire (millisecond precision, `Z`)
pub fn to_iso(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `serialize_with` form of [`to_iso`]
pub fn serialize_iso<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_iso(*timestamp))
}

/// Aggregate statistics of one device for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: String,
    pub average_activity: f64,
    pub max_activity: f64,
    pub average_breath: f64,
    pub max_breath: f64,
    pub active_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_valid_query() {
        let query = HistoryQuery::parse(
            Some("DEV1"),
            "2024-01-01T00:00:00Z",
            "2024-01-01T06:00:00Z",
            Some("6h"),
        )
        .unwrap();

        assert_eq!(query.device_id(), "DEV1");
        assert_eq!(query.window(), TimeWindow::SixHours);
        assert_eq!(
            query.query_params(),
            [
                ("start", "2024-01-01T00:00:00.000Z".to_owned()),
                ("end", "2024-01-01T06:00:00.000Z".to_owned()),
                ("window", "6h".to_owned()),
            ]
        );
    }

    #[test]
    fn test_window_defaults_to_one_hour() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let query = HistoryQuery::new("DEV1", start, start, None).unwrap();
        assert_eq!(query.window(), TimeWindow::OneHour);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(
            HistoryQuery::parse(None, "2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z", None),
            Err(QueryError::MissingDeviceId)
        );
        assert_eq!(
            HistoryQuery::parse(Some("  "), "2024-01-01T00:00:00Z", "2024-01-01T01:00:00Z", None),
            Err(QueryError::MissingDeviceId)
        );
        assert!(matches!(
            HistoryQuery::parse(Some("DEV1"), "yesterday", "2024-01-01T01:00:00Z", None),
            Err(QueryError::InvalidTimestamp { field: "start", .. })
        ));
        assert!(matches!(
            HistoryQuery::parse(Some("DEV1"), "2024-01-02T00:00:00Z", "2024-01-01T00:00:00Z", None),
            Err(QueryError::InvertedRange { .. })
        ));
        assert_eq!(
            HistoryQuery::parse(
                Some("DEV1"),
                "2024-01-01T00:00:00Z",
                "2024-01-01T01:00:00Z",
                Some("today")
            ),
            Err(QueryError::UnknownWindow("today".to_owned()))
        );
    }

    #[test]
    fn test_daily_stats_passthrough() {
        let stats: DailyStats = serde_json::from_str(
            r#"{"date":"2024-01-01","averageActivity":10.5,"maxActivity":40,"averageBreath":3.2,"maxBreath":9,"activeHours":6}"#,
        )
        .unwrap();
        assert_eq!(stats.max_activity, 40.0);
        assert_eq!(stats.active_hours, 6.0);
    }
}
