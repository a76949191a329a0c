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

//! Derived views over devices and readings for the dashboard screens

use std::collections::BTreeMap;
use std::fmt;

use matehome_types::{CanonicalReading, Device};
use serde::Serialize;

/// Devices whose room label is one of `featured`, in list order
pub fn featured_devices<'a>(devices: &'a [Device], featured: &[String]) -> Vec<&'a Device> {
    devices
        .iter()
        .filter(|device| featured.iter().any(|name| device.has_name(name)))
        .collect()
}

/// Home screen totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub online: usize,
    pub total: usize,
    /// Sum of current activity seconds, devices without a reading count as 0
    pub total_activity: f64,
    pub average_breath: f64,
}

impl DashboardSummary {
    #[expect(
        clippy::cast_precision_loss,
        reason = "device counts are far below f64 mantissa range"
    )]
    pub fn compute(devices: &[Device], readings: &BTreeMap<String, CanonicalReading>) -> Self {
        let reading_of = |device: &Device| readings.get(&device.id);

        let total_activity = devices
            .iter()
            .filter_map(reading_of)
            .map(|reading| reading.activity_seconds)
            .sum();
        let total_breath: f64 = devices
            .iter()
            .filter_map(reading_of)
            .map(|reading| reading.breath_seconds)
            .sum();

        Self {
            online: devices.iter().filter(|device| device.is_online()).count(),
            total: devices.len(),
            total_activity,
            average_breath: total_breath / devices.len().max(1) as f64,
        }
    }
}

/// Kind of room a device watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomKind {
    Bathroom,
    LivingRoom,
    Other,
}

impl RoomKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "bagno" => Self::Bathroom,
            "soggiorno" | "camera" => Self::LivingRoom,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bathroom => "bathroom",
            Self::LivingRoom => "living room",
            Self::Other => "room",
        }
    }
}

/// Intensity band of an activity value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    Low,
    Moderate,
    Intense,
}

impl ActivityLevel {
    pub fn classify(activity_seconds: f64) -> Self {
        if activity_seconds > 50.0 {
            Self::Intense
        } else if activity_seconds > 20.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Intense => "intense",
        };
        f.write_str(label)
    }
}

/// Readings ordered by time for plotting
pub fn chart_series(readings: &[CanonicalReading]) -> Vec<CanonicalReading> {
    let mut series = readings.to_vec();
    series.sort_by_key(|reading| reading.time);
    series
}

/// Average and peak of both metrics over a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStats {
    pub count: usize,
    pub average_activity: f64,
    pub max_activity: f64,
    pub average_breath: f64,
    pub max_breath: f64,
}

impl SeriesStats {
    #[expect(
        clippy::cast_precision_loss,
        reason = "series lengths are far below f64 mantissa range"
    )]
    pub fn from_readings(readings: &[CanonicalReading]) -> Self {
        if readings.is_empty() {
            return Self::default();
        }

        let count = readings.len();
        let (activity_sum, breath_sum, max_activity, max_breath) = readings.iter().fold(
            (0.0, 0.0, 0.0_f64, 0.0_f64),
            |(activity, breath, max_activity, max_breath), reading| {
                (
                    activity + reading.activity_seconds,
                    breath + reading.breath_seconds,
                    max_activity.max(reading.activity_seconds),
                    max_breath.max(reading.breath_seconds),
                )
            },
        );

        Self {
            count,
            average_activity: activity_sum / count as f64,
            max_activity,
            average_breath: breath_sum / count as f64,
            max_breath,
        }
    }

    /// Upper bound of the chart's value axis: 10% headroom, at least 1
    pub fn axis_max(&self) -> f64 {
        (self.max_activity.max(self.max_breath) * 1.1).ceil().max(1.0)
    }
}
