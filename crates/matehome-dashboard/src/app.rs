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

use std::fmt::Write;
use std::future::Future;
use std::sync::Arc;

use matehome_core::DashboardApi;
use matehome_core::polling::{
    DeviceDataSource, DeviceSource, HistoryParams, HistorySource, OverviewSource,
    spawn_device_data_poller, spawn_device_poller, spawn_history_poller, spawn_overview_poller,
};
use matehome_core::{PollSnapshot, Poller};
use matehome_types::TimeRange;
use tokio::sync::watch;
use tracing::info;

use crate::config::DashboardConfig;
use crate::render;

/// Pollers of the device detail view
#[derive(Debug)]
struct DetailPollers {
    device_id: String,
    range: TimeRange,
    device: Poller<DeviceSource>,
    data: Poller<DeviceDataSource>,
    history: Poller<HistorySource>,
}

/// Running dashboard: the overview poller plus the detail pollers of one device
#[derive(Debug)]
pub struct DashboardApp {
    featured: Vec<String>,
    overview: Poller<OverviewSource>,
    detail: Option<DetailPollers>,
}

impl DashboardApp {
    pub fn start(
        api: Arc<dyn DashboardApi>,
        config: &DashboardConfig,
        device_id: Option<String>,
    ) -> Self {
        let polling = &config.polling;
        let overview = spawn_overview_poller(Arc::clone(&api), polling.overview_period());

        let detail = device_id.map(|device_id| {
            info!(device_id = %device_id, "Opening device detail view");
            let range = TimeRange::default();
            let params = HistoryParams::sliding(Some(device_id.clone()), range);
            DetailPollers {
                device: spawn_device_poller(
                    Arc::clone(&api),
                    device_id.clone(),
                    polling.device_period(),
                ),
                data: spawn_device_data_poller(
                    Arc::clone(&api),
                    Some(device_id.clone()),
                    polling.device_data_period(),
                ),
                history: spawn_history_poller(
                    Arc::clone(&api),
                    params,
                    polling.history_period(),
                    polling.history_throttle(),
                ),
                device_id,
                range,
            }
        });

        Self {
            featured: config.rooms.featured.clone(),
            overview,
            detail,
        }
    }

    pub fn overview(&self) -> &Poller<OverviewSource> {
        &self.overview
    }

    /// Full text rendering of the current state
    pub fn render(&self) -> String {
        let mut out = String::new();

        let overview = self.overview.snapshot();
        out.push_str(&render_section("overview", &overview, |data| {
            render::overview(data, &self.featured)
        }));

        if let Some(detail) = &self.detail {
            let current = overview
                .data
                .as_ref()
                .and_then(|data| data.reading_for(&detail.device_id));
            let device = detail.device.snapshot();
            out.push_str(&render_section("device", &device, |device| {
                render::device_card(device, current)
            }));
            out.push('\n');

            let data = detail.data.snapshot();
            out.push_str(&render_section("readings", &data, |readings| {
                render::legacy_readings(readings)
            }));

            let history = detail.history.snapshot();
            out.push_str(&render_section("history", &history, |readings| {
                render::history(readings, detail.range)
            }));
        }
        out
    }

    /// Re-render on every published change until `shutdown` resolves
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        let mut overview_rx = self.overview.subscribe();
        let (mut device_rx, mut data_rx, mut history_rx) = match &self.detail {
            Some(detail) => (
                Some(detail.device.subscribe()),
                Some(detail.data.subscribe()),
                Some(detail.history.subscribe()),
            ),
            None => (None, None, None),
        };

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                Ok(()) = overview_rx.changed() => {}
                true = next_change(device_rx.as_mut()) => {}
                true = next_change(data_rx.as_mut()) => {}
                true = next_change(history_rx.as_mut()) => {}
            }
            println!("{}", self.render());
        }

        self.teardown().await;
    }

    pub async fn teardown(self) {
        info!("🛑 Shutting down dashboard pollers");
        if let Some(detail) = self.detail {
            detail.device.teardown().await;
            detail.data.teardown().await;
            detail.history.teardown().await;
        }
        self.overview.teardown().await;
    }
}

fn render_section<T>(
    label: &str,
    snapshot: &PollSnapshot<T>,
    body: impl FnOnce(&T) -> String,
) -> String {
    let mut out = render::error_line(label, snapshot).unwrap_or_default();
    match &snapshot.data {
        Some(data) => out.push_str(&body(data)),
        None if snapshot.loading => {
            let _ = writeln!(out, "⏳ Loading {label}...");
        }
        None => {}
    }
    out
}

async fn next_change<T>(rx: Option<&mut watch::Receiver<T>>) -> bool {
    match rx {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}
