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

//! Poller behaviour against a scripted backend
//!
//! All tests run on paused tokio time, so the 5/30/60 second periods elapse
//! instantly and deterministically.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use matehome_client::{ApiError, ApiResult, ErrorKind};
use matehome_core::DashboardApi;
use matehome_core::polling::{
    DEVICE_DATA_PERIOD, DEVICE_PERIOD, DEVICES_PERIOD, HISTORY_PERIOD, HISTORY_THROTTLE,
    HistoryParams, OVERVIEW_PERIOD, PollSnapshot, spawn_device_data_poller, spawn_device_poller,
    spawn_devices_poller, spawn_history_poller, spawn_overview_poller,
};
use matehome_types::{
    CanonicalReading, Device, DeviceStatus, HistoryQuery, RawLegacyReading, TimeRange,
};
use serde_json::json;
use tokio::sync::watch;
use tokio::time::sleep;

/// Scripted backend that counts calls
#[derive(Default)]
struct FakeApi {
    devices: Mutex<Vec<Device>>,
    fail_devices: AtomicBool,
    device_delays: Mutex<VecDeque<Duration>>,
    legacy: Mutex<Vec<RawLegacyReading>>,
    history: Mutex<Vec<CanonicalReading>>,
    history_devices: Mutex<Vec<String>>,

    devices_calls: AtomicUsize,
    device_calls: AtomicUsize,
    device_completed: AtomicUsize,
    readings_calls: AtomicUsize,
    legacy_calls: AtomicUsize,
    history_calls: AtomicUsize,
}

impl FakeApi {
    fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn list_devices(&self) -> ApiResult<Vec<Device>> {
        self.devices_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_devices.load(Ordering::SeqCst) {
            return Err(ApiError::RequestFailed("backend unavailable".to_owned()));
        }
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn get_device(&self, id: &str) -> ApiResult<Device> {
        self.device_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.device_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        self.device_completed.fetch_add(1, Ordering::SeqCst);
        Ok(device(id, "bagno", DeviceStatus::Online))
    }

    async fn get_current_readings(&self) -> ApiResult<BTreeMap<String, CanonicalReading>> {
        self.readings_calls.fetch_add(1, Ordering::SeqCst);
        Ok(BTreeMap::from([(
            "DEV1".to_owned(),
            reading(0, 12.0, 4.0),
        )]))
    }

    async fn get_history(&self, query: &HistoryQuery) -> ApiResult<Vec<CanonicalReading>> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_devices
            .lock()
            .unwrap()
            .push(query.device_id().to_owned());
        Ok(self.history.lock().unwrap().clone())
    }

    async fn get_device_readings(
        &self,
        _device_id: Option<&str>,
    ) -> ApiResult<Vec<RawLegacyReading>> {
        self.legacy_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.legacy.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

fn device(id: &str, name: &str, status: DeviceStatus) -> Device {
    Device {
        id: id.to_owned(),
        name: name.to_owned(),
        status,
        last_update: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        kind: Some("RADAR".to_owned()),
        last_reading: None,
    }
}

fn reading(minute: u32, activity: f64, breath: f64) -> CanonicalReading {
    CanonicalReading {
        device_id: "DEV1".to_owned(),
        time: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
        activity_seconds: activity,
        breath_seconds: breath,
    }
}

fn legacy(all: &str, breath: &str) -> RawLegacyReading {
    serde_json::from_value(json!({
        "sname": { "S": "bagno" },
        "ts": { "S": "2024-01-01T00:00:00Z" },
        "Activity": { "M": { "activity": { "M": {
            "all": { "L": [ { "N": all } ] },
            "breath": { "L": [ { "N": breath } ] }
        } } } }
    }))
    .unwrap()
}

fn history_params(device_id: Option<&str>, end_hour: u32) -> HistoryParams {
    HistoryParams {
        device_id: device_id.map(str::to_owned),
        start: "2024-01-01T00:00:00Z".to_owned(),
        end: format!("2024-01-01T{end_hour:02}:00:00Z"),
        window: Some("1h".to_owned()),
        range: None,
    }
}

async fn wait_until<T: Clone>(
    rx: &mut watch::Receiver<PollSnapshot<T>>,
    done: impl Fn(&PollSnapshot<T>) -> bool,
) -> PollSnapshot<T> {
    loop {
        let snapshot = rx.borrow_and_update().clone();
        if done(&snapshot) {
            return snapshot;
        }
        rx.changed().await.expect("poller stopped publishing");
    }
}

#[tokio::test(start_paused = true)]
async fn test_history_throttle_skips_changes_within_interval() {
    let api = Arc::new(FakeApi::default());
    *api.history.lock().unwrap() = vec![reading(0, 5.0, 1.0), reading(1, -3.0, 2.0)];

    let poller = spawn_history_poller(
        api.clone(),
        history_params(Some("DEV1"), 1),
        HISTORY_PERIOD,
        HISTORY_THROTTLE,
    );
    let mut rx = poller.subscribe();

    // first fetch at t0 always proceeds
    let first = wait_until(&mut rx, |s| s.data.is_some()).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 1);
    let data = first.data.unwrap();
    assert_eq!(data.len(), 2);
    assert!(
        data.iter()
            .all(|r| r.activity_seconds >= 0.0 && r.breath_seconds >= 0.0)
    );

    // dependency change at t0+10s is throttled and leaves the timer alone
    sleep(Duration::from_secs(10)).await;
    assert!(poller.set_params(history_params(Some("DEV2"), 2)));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 1);

    // the tick at t0+30s fetches with the pending parameters
    sleep(Duration::from_secs(20)).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 2);

    assert_eq!(
        *api.history_devices.lock().unwrap(),
        vec!["DEV1".to_owned(), "DEV2".to_owned()]
    );

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_history_change_past_throttle_restarts_timer() {
    let api = Arc::new(FakeApi::default());

    let poller = spawn_history_poller(
        api.clone(),
        history_params(Some("DEV1"), 1),
        HISTORY_PERIOD,
        Duration::from_secs(10),
    );

    // change at t0+15s is past the throttle, fetched at once
    sleep(Duration::from_secs(15)).await;
    assert!(poller.set_params(history_params(Some("DEV2"), 2)));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 2);

    // no tick at t0+30s, the next one is a full period after the change
    sleep(Duration::from_secs(15)).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 2);
    sleep(Duration::from_secs(15)).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 3);

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_sliding_history_fetches_once_per_period() {
    let api = Arc::new(FakeApi::default());
    *api.history.lock().unwrap() = vec![reading(0, 5.0, 1.0)];

    let poller = spawn_history_poller(
        api.clone(),
        HistoryParams::sliding(Some("DEV1".to_owned()), TimeRange::OneHour),
        HISTORY_PERIOD,
        HISTORY_THROTTLE,
    );

    sleep(Duration::from_secs(1)).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 1);

    for period in 1..=10 {
        sleep(HISTORY_PERIOD).await;
        assert_eq!(FakeApi::calls(&api.history_calls), 1 + period);
    }
    assert!(
        api.history_devices
            .lock()
            .unwrap()
            .iter()
            .all(|id| id == "DEV1")
    );

    // re-sending the same sliding parameters is not a change
    assert!(!poller.set_params(HistoryParams::sliding(
        Some("DEV1".to_owned()),
        TimeRange::OneHour
    )));

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_history_timer_refetches_after_throttle() {
    let api = Arc::new(FakeApi::default());
    *api.history.lock().unwrap() = vec![reading(0, 5.0, 1.0)];

    let poller = spawn_history_poller(
        api.clone(),
        history_params(Some("DEV1"), 1),
        HISTORY_PERIOD,
        HISTORY_THROTTLE,
    );

    sleep(Duration::from_secs(1)).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 1);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(FakeApi::calls(&api.history_calls), 2);

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_history_missing_device_id_is_input_invalid() {
    let api = Arc::new(FakeApi::default());

    let poller = spawn_history_poller(
        api.clone(),
        history_params(None, 1),
        HISTORY_PERIOD,
        HISTORY_THROTTLE,
    );
    let mut rx = poller.subscribe();

    let snapshot = wait_until(&mut rx, |s| s.error.is_some()).await;
    let error = snapshot.error.unwrap();
    assert_eq!(error.kind, ErrorKind::InputInvalid);
    assert_eq!(error.message, "Device ID is required");
    assert!(!snapshot.loading);
    assert!(snapshot.data.is_none());
    assert_eq!(FakeApi::calls(&api.history_calls), 0);

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_poll_keeps_stale_data() {
    let api = Arc::new(FakeApi::default());
    *api.devices.lock().unwrap() = vec![device("DEV1", "bagno", DeviceStatus::Online)];

    let poller = spawn_devices_poller(api.clone(), DEVICES_PERIOD);
    let mut rx = poller.subscribe();

    let settled = wait_until(&mut rx, |s| s.data.is_some()).await;
    assert!(settled.error.is_none());
    assert!(!settled.loading);

    api.fail_devices.store(true, Ordering::SeqCst);
    let failed = wait_until(&mut rx, |s| s.error.is_some()).await;
    assert!(failed.is_stale());
    assert_eq!(failed.data, settled.data);
    assert_eq!(failed.revision, settled.revision);
    assert_eq!(failed.error.unwrap().kind, ErrorKind::RequestFailed);

    api.fail_devices.store(false, Ordering::SeqCst);
    let recovered = wait_until(&mut rx, |s| s.error.is_none()).await;
    assert_eq!(recovered.data, settled.data);
    assert_eq!(FakeApi::calls(&api.devices_calls), 3);

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_identical_raw_readings_do_not_republish() {
    let api = Arc::new(FakeApi::default());
    *api.legacy.lock().unwrap() = vec![legacy("12", "4")];

    let poller = spawn_device_data_poller(api.clone(), Some("DEV1".to_owned()), DEVICE_DATA_PERIOD);
    let mut rx = poller.subscribe();

    let first = wait_until(&mut rx, |s| s.data.is_some()).await;
    assert_eq!(first.revision, 1);

    // same raw tokens on the next tick
    sleep(DEVICE_DATA_PERIOD + Duration::from_secs(1)).await;
    assert_eq!(FakeApi::calls(&api.legacy_calls), 2);
    assert!(!rx.has_changed().unwrap());
    assert_eq!(poller.snapshot().revision, 1);

    // a changed token replaces the data
    *api.legacy.lock().unwrap() = vec![legacy("13", "4")];
    let changed = wait_until(&mut rx, |s| s.revision == 2).await;
    let readings = changed.data.unwrap();
    assert_eq!(readings[0].activity_seconds, Some(13.0));

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_superseded_fetch_is_discarded() {
    let api = Arc::new(FakeApi::default());
    api.device_delays
        .lock()
        .unwrap()
        .extend([Duration::from_secs(10), Duration::from_secs(1)]);

    let poller = spawn_device_poller(api.clone(), "DEV1", DEVICE_PERIOD);

    // second fetch issued while the first is still pending
    sleep(Duration::from_secs(1)).await;
    assert!(poller.set_params("DEV2".to_owned()));

    // first fetch resolves at t=10s, after the second one
    sleep(Duration::from_millis(9500)).await;
    assert!(FakeApi::calls(&api.device_completed) >= 2);
    let snapshot = poller.snapshot();
    assert_eq!(snapshot.data.unwrap().id, "DEV2");
    assert_eq!(snapshot.revision, 1);

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_teardown_before_fetch_resolves() {
    let api = Arc::new(FakeApi::default());
    api.device_delays
        .lock()
        .unwrap()
        .push_back(Duration::from_secs(10));

    let poller = spawn_device_poller(api.clone(), "DEV1", DEVICE_PERIOD);
    let rx = poller.subscribe();

    sleep(Duration::from_secs(1)).await;
    assert_eq!(FakeApi::calls(&api.device_calls), 1);
    poller.teardown().await;

    sleep(Duration::from_secs(60)).await;
    assert_eq!(FakeApi::calls(&api.device_calls), 1);
    assert_eq!(FakeApi::calls(&api.device_completed), 0);
    assert!(rx.borrow().data.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_empty_device_id_is_rejected() {
    let api = Arc::new(FakeApi::default());

    let poller = spawn_device_poller(api.clone(), "", DEVICE_PERIOD);
    let mut rx = poller.subscribe();

    let snapshot = wait_until(&mut rx, |s| s.error.is_some()).await;
    assert_eq!(snapshot.error.unwrap().kind, ErrorKind::InputInvalid);
    assert_eq!(FakeApi::calls(&api.device_calls), 0);

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_set_params_ignores_identical_value() {
    let api = Arc::new(FakeApi::default());

    let poller = spawn_device_poller(api.clone(), "DEV1", DEVICE_PERIOD);
    sleep(Duration::from_secs(1)).await;

    assert!(!poller.set_params("DEV1".to_owned()));
    sleep(Duration::from_secs(1)).await;
    assert_eq!(FakeApi::calls(&api.device_calls), 1);
    assert_eq!(poller.params(), "DEV1");

    poller.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_overview_joins_devices_and_readings() {
    let api = Arc::new(FakeApi::default());
    *api.devices.lock().unwrap() = vec![
        device("DEV1", "bagno", DeviceStatus::Online),
        device("DEV2", "camera", DeviceStatus::Offline),
    ];

    let poller = spawn_overview_poller(api.clone(), OVERVIEW_PERIOD);
    let mut rx = poller.subscribe();

    let snapshot = wait_until(&mut rx, |s| s.data.is_some()).await;
    let overview = snapshot.data.unwrap();
    assert_eq!(overview.devices.len(), 2);
    assert_eq!(overview.reading_for("DEV1").unwrap().activity_seconds, 12.0);
    assert!(overview.reading_for("DEV2").is_none());

    sleep(OVERVIEW_PERIOD + Duration::from_secs(1)).await;
    assert_eq!(FakeApi::calls(&api.devices_calls), 2);
    assert_eq!(FakeApi::calls(&api.readings_calls), 2);
    assert_eq!(poller.snapshot().revision, 1);

    poller.teardown().await;
}
