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

//! Legacy reading normalization
//!
//! Legacy readings arrive in the tagged attribute encoding:
//!
//! ```text
//! sname                                -> S          device name
//! ts                                   -> S          reading time
//! Activity.M.activity.M.all.L[0].N     -> N string   activity seconds
//! Activity.M.activity.M.breath.L[0].N  -> N string   breath seconds
//! deviceInfo.M.{battery, charging, signalStrength, status, lastHeartbeat}
//! ```
//!
//! Any missing layer yields "no value". A reading without a valid `ts` is
//! kept for display but is incomplete: it has no change key and no canonical
//! form.

use chrono::{DateTime, Utc};
use matehome_types::reading::clamp_metric;
use matehome_types::{AttributeValue, CanonicalReading, RawLegacyReading, parse_timestamp};
use serde::Serialize;
use tracing::debug;

const ACTIVITY_PATH: [&str; 2] = ["Activity", "activity"];

/// Device health block carried by some legacy readings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDeviceInfo {
    pub battery: Option<f64>,
    pub charging: Option<bool>,
    pub signal_strength: Option<f64>,
    pub status: Option<String>,
    pub last_heartbeat: Option<String>,
}

/// Raw `(all, breath)` tokens of a reading, compared before numeric parsing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeKey {
    pub all: String,
    pub breath: String,
}

/// A legacy reading unwrapped into plain fields
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReading {
    /// Room slug from `sname`, empty when absent
    pub device_name: String,
    pub time: Option<DateTime<Utc>>,
    pub activity_seconds: Option<f64>,
    pub breath_seconds: Option<f64>,
    pub device_info: Option<LegacyDeviceInfo>,
    #[serde(skip)]
    raw_all: Option<String>,
    #[serde(skip)]
    raw_breath: Option<String>,
}

impl NormalizedReading {
    /// Reading has a valid time and both raw metric tokens
    pub fn is_complete(&self) -> bool {
        self.time.is_some() && self.raw_all.is_some() && self.raw_breath.is_some()
    }

    pub fn change_key(&self) -> Option<ChangeKey> {
        if !self.is_complete() {
            return None;
        }
        Some(ChangeKey {
            all: self.raw_all.clone()?,
            breath: self.raw_breath.clone()?,
        })
    }

    /// Canonical form; absent metrics count as 0
    pub fn to_canonical(&self, device_id: &str) -> Option<CanonicalReading> {
        Some(CanonicalReading {
            device_id: device_id.to_owned(),
            time: self.time?,
            activity_seconds: self.display_activity(),
            breath_seconds: self.display_breath(),
        })
    }

    pub fn display_activity(&self) -> f64 {
        clamp_metric(self.activity_seconds.unwrap_or(0.0))
    }

    pub fn display_breath(&self) -> f64 {
        clamp_metric(self.breath_seconds.unwrap_or(0.0))
    }
}

/// Unwrap a legacy reading; never fails
pub fn normalize(raw: &RawLegacyReading) -> NormalizedReading {
    let device_name = raw
        .get("sname")
        .and_then(AttributeValue::as_s)
        .unwrap_or_default()
        .to_owned();

    let time = raw
        .get("ts")
        .and_then(AttributeValue::as_s)
        .and_then(parse_timestamp);
    if time.is_none() {
        debug!("Legacy reading for '{}' has no valid ts", device_name);
    }

    let activity = raw
        .get(ACTIVITY_PATH[0])
        .and_then(|value| value.path(&ACTIVITY_PATH[1..]));
    let raw_all = metric_token(activity, "all");
    let raw_breath = metric_token(activity, "breath");

    NormalizedReading {
        device_name,
        time,
        activity_seconds: raw_all.as_deref().and_then(parse_metric),
        breath_seconds: raw_breath.as_deref().and_then(parse_metric),
        device_info: raw.get("deviceInfo").and_then(device_info),
        raw_all,
        raw_breath,
    }
}

pub fn normalize_all(raw: &[RawLegacyReading]) -> Vec<NormalizedReading> {
    raw.iter().map(normalize).collect()
}

fn metric_token(activity: Option<&AttributeValue>, name: &str) -> Option<String> {
    activity?.field(name)?.first_n().map(str::to_owned)
}

fn parse_metric(token: &str) -> Option<f64> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn device_info(value: &AttributeValue) -> Option<LegacyDeviceInfo> {
    value.as_m()?;
    Some(LegacyDeviceInfo {
        battery: value.field("battery").and_then(AttributeValue::as_f64),
        charging: value.field("charging").and_then(AttributeValue::as_bool),
        signal_strength: value
            .field("signalStrength")
            .and_then(AttributeValue::as_f64),
        status: value
            .field("status")
            .and_then(AttributeValue::as_s)
            .map(str::to_owned),
        last_heartbeat: value
            .field("lastHeartbeat")
            .and_then(AttributeValue::as_s)
            .map(str::to_owned),
    })
}

/// Two consecutive polls are unchanged iff their first readings carry equal keys
pub fn is_unchanged(previous: &[NormalizedReading], next: &[NormalizedReading]) -> bool {
    let (Some(previous), Some(next)) = (previous.first(), next.first()) else {
        return false;
    };
    matches!(
        (previous.change_key(), next.change_key()),
        (Some(previous), Some(next)) if previous == next
    )
}

/// Keep history elements with finite metrics, clamped to a minimum of 0
pub fn sanitize_history(readings: Vec<CanonicalReading>) -> Vec<CanonicalReading> {
    readings
        .into_iter()
        .filter(CanonicalReading::has_finite_metrics)
        .map(|reading| reading.clamped())
        .collect()
}
