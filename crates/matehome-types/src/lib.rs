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

//! Shared data types for the MATE HOME radar dashboard
//!
//! - `device`: radar sensor units as served by the backend
//! - `reading`: the canonical reading shape and the "current reading" wire shape
//! - `legacy`: the nested attribute-value encoding used by the legacy readings path
//! - `history`: validated history queries, query windows and daily statistics
//! - `time`: time-range tokens, start-of-day truncation and clock formatting

pub mod device;
pub mod history;
pub mod legacy;
pub mod reading;
pub mod time;

pub use device::{Device, DeviceLastReading, DeviceStatus};
pub use history::{DailyStats, HistoryQuery, QueryError, TimeWindow};
pub use legacy::{AttributeMap, AttributeValue, DeviceReadingItem, RawLegacyReading};
pub use reading::{ActivityPair, CanonicalReading, CurrentReading};
pub use time::{
    TimeRange, format_clock_time, format_local_clock_time, parse_timestamp, range_to_ms,
};
