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

//! Plain-text rendering of the dashboard screens

use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone};
use matehome_core::polling::Overview;
use matehome_core::summary::{self, chart_series};
use matehome_core::{
    ActivityLevel, DashboardSummary, NormalizedReading, PollError, PollSnapshot, RoomKind,
    SeriesStats,
};
use matehome_types::{CanonicalReading, Device, TimeRange, format_local_clock_time};

fn room_icon(name: &str) -> &'static str {
    match RoomKind::from_name(name) {
        RoomKind::Bathroom => "🛁",
        RoomKind::LivingRoom => "🛋️",
        RoomKind::Other => "📡",
    }
}

/// One device card: room, status, current metrics
pub fn device_card(device: &Device, reading: Option<&CanonicalReading>) -> String {
    let activity = reading.map_or(0.0, |r| r.activity_seconds);
    let breath = reading.map_or(0.0, |r| r.breath_seconds);
    let updated = reading.map_or(device.last_update, |r| r.time);

    format!(
        "{} {} [{}] activity {:.0}s ({}) | breath {:.0}s | updated {}",
        room_icon(&device.name),
        device.name,
        if device.is_online() { "online" } else { "offline" },
        activity,
        ActivityLevel::classify(activity),
        breath,
        format_local_clock_time(updated)
    )
}

/// Home screen: summary line and cards of the featured rooms
pub fn overview(overview: &Overview, featured: &[String]) -> String {
    let devices: Vec<Device> = if featured.is_empty() {
        overview.devices.clone()
    } else {
        summary::featured_devices(&overview.devices, featured)
            .into_iter()
            .cloned()
            .collect()
    };
    let totals = DashboardSummary::compute(&devices, &overview.readings);

    let mut out = format!(
        "🏠 Active devices: {}/{} | total activity {:.0}s | average breath {:.0}\n",
        totals.online, totals.total, totals.total_activity, totals.average_breath
    );
    if devices.is_empty() {
        out.push_str("   no devices\n");
    }
    for device in &devices {
        let _ = writeln!(
            out,
            "   {}",
            device_card(device, overview.reading_for(&device.id))
        );
    }
    out
}

/// Legacy readings of the device detail view
pub fn legacy_readings(readings: &[NormalizedReading]) -> String {
    let Some(latest) = readings.first() else {
        return "📟 No readings available\n".to_owned();
    };

    let mut out = format!(
        "📟 {} activity {:.0}s | breath {:.0}s | {}\n",
        if latest.device_name.is_empty() {
            "unknown"
        } else {
            latest.device_name.as_str()
        },
        latest.display_activity(),
        latest.display_breath(),
        latest.time.map_or_else(|| "time unknown".to_owned(), format_local_clock_time)
    );
    if let Some(info) = &latest.device_info {
        let _ = writeln!(
            out,
            "   battery {} | charging {} | signal {} | {}",
            info.battery
                .map_or_else(|| "-".to_owned(), |b| format!("{b:.0}%")),
            info.charging.map_or("-", |c| if c { "yes" } else { "no" }),
            info.signal_strength
                .map_or_else(|| "-".to_owned(), |s| format!("{s:.0}%")),
            info.status.as_deref().unwrap_or("-"),
        );
    }
    out
}

/// Length of `range` at `now`, as `XhYYm`
fn span_label<Tz: TimeZone>(range: TimeRange, now: &DateTime<Tz>) -> String {
    let minutes = range.span_ms(now) / 60_000;
    format!("{}h{:02}m", minutes / 60, minutes % 60)
}

/// History stats for the selected range
pub fn history(readings: &[CanonicalReading], range: TimeRange) -> String {
    history_at(readings, range, &Local::now())
}

fn history_at<Tz: TimeZone>(
    readings: &[CanonicalReading],
    range: TimeRange,
    now: &DateTime<Tz>,
) -> String {
    let span = span_label(range, now);
    if readings.is_empty() {
        return format!("📈 [{range}, {span}] No historical data\n");
    }

    let series = chart_series(readings);
    let stats = SeriesStats::from_readings(&series);
    let mut out = format!(
        "📈 [{range}, {span}] {} points | activity avg {:.1}s max {:.0}s | breath avg {:.1}s max {:.0}s\n",
        stats.count,
        stats.average_activity,
        stats.max_activity,
        stats.average_breath,
        stats.max_breath
    );
    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        let _ = writeln!(
            out,
            "   {} .. {}",
            format_local_clock_time(first.time),
            format_local_clock_time(last.time)
        );
    }
    out
}

/// Error banner, with a stale-data hint when older data is still shown
pub fn error_line<T>(label: &str, snapshot: &PollSnapshot<T>) -> Option<String> {
    let error: &PollError = snapshot.error.as_ref()?;
    let hint = if snapshot.data.is_some() {
        " (showing last known data)"
    } else {
        ""
    };
    Some(format!("⚠️ {label}: {}{hint}\n", error.message))
}
