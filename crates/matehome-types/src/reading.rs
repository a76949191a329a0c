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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity metrics as the backend nests them (`activity.all`, `activity.breath`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityPair {
    /// General movement intensity/duration (seconds)
    pub all: f64,
    /// Respiratory motion (seconds)
    pub breath: f64,
}

/// Normalized point-in-time measurement for one device
///
/// Every consumer (cards, charts, summaries) receives readings in this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReading {
    pub device_id: String,
    /// Observation time
    #[serde(serialize_with = "crate::history::serialize_iso")]
    pub time: DateTime<Utc>,
    pub activity_seconds: f64,
    pub breath_seconds: f64,
}

impl CanonicalReading {
    /// Copy of the reading with both metrics clamped to a minimum of 0
    pub fn clamped(&self) -> Self {
        Self {
            device_id: self.device_id.clone(),
            time: self.time,
            activity_seconds: clamp_metric(self.activity_seconds),
            breath_seconds: clamp_metric(self.breath_seconds),
        }
    }

    pub fn has_finite_metrics(&self) -> bool {
        self.activity_seconds.is_finite() && self.breath_seconds.is_finite()
    }
}

/// Latest reading per device as served by `/devices/readings/current`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentReading {
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub activity: ActivityPair,
}

/// Shape rename: `timestamp` → `time`, `activity.all` → `activitySeconds`,
/// `activity.breath` → `breathSeconds`
impl From<CurrentReading> for CanonicalReading {
    fn from(reading: CurrentReading) -> Self {
        Self {
            device_id: reading.device_id,
            time: reading.timestamp,
            activity_seconds: clamp_metric(reading.activity.all),
            breath_seconds: clamp_metric(reading.activity.breath),
        }
    }
}

/// Metrics never go below zero once normalized
pub fn clamp_metric(value: f64) -> f64 {
    value.max(0.0)
}
