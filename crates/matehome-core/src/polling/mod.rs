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

//! Periodic data pollers
//!
//! Every poller is one tokio task driving the same cycle for a [`PollSource`]:
//!
//! ```text
//! Idle --(activation | params change | tick)--> Fetching
//! Fetching --(latest result ok)--> Settled --> Idle
//! Fetching --(latest result err)--> Failed --> Idle
//! ```
//!
//! Fetches run on a `JoinSet` owned by the task and report back with their
//! sequence number; only the most recently issued one is applied. A failed
//! fetch keeps the last good data and sets the error next to it. Consumers
//! read published [`PollSnapshot`]s through a `watch` channel and push new
//! parameters through another one.

mod device;
mod device_data;
mod devices;
mod history;
mod overview;

pub use device::{DeviceSource, spawn_device_poller};
pub use device_data::{DeviceDataSource, spawn_device_data_poller};
pub use devices::{DevicesSource, spawn_devices_poller};
pub use history::{HistoryParams, HistorySource, spawn_history_poller};
pub use overview::{Overview, OverviewSource, spawn_overview_poller};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use matehome_client::{ApiError, ErrorKind};
use matehome_types::QueryError;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

pub const DEVICES_PERIOD: Duration = Duration::from_secs(30);
pub const DEVICE_PERIOD: Duration = Duration::from_secs(5);
pub const DEVICE_DATA_PERIOD: Duration = Duration::from_secs(30);
pub const HISTORY_PERIOD: Duration = Duration::from_secs(30);
pub const HISTORY_THROTTLE: Duration = Duration::from_secs(30);
pub const OVERVIEW_PERIOD: Duration = Duration::from_secs(60);

/// Failure published on a poller's state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PollError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PollError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ApiError> for PollError {
    fn from(error: ApiError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}

impl From<QueryError> for PollError {
    fn from(error: QueryError) -> Self {
        Self::new(ErrorKind::InputInvalid, error.to_string())
    }
}

/// What a poller fetches and how consecutive results are compared
#[async_trait]
pub trait PollSource: Send + Sync + 'static {
    type Params: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    type Output: Clone + fmt::Debug + Send + Sync + 'static;

    /// Poller name for logging
    fn name(&self) -> &'static str;

    async fn fetch(&self, params: &Self::Params) -> Result<Self::Output, PollError>;

    /// `true` keeps the previous data and skips the publish
    fn is_unchanged(&self, _previous: &Self::Output, _next: &Self::Output) -> bool {
        false
    }
}

/// Timing of one poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Re-fetch period
    pub period: Duration,
    /// Minimum time since the last successful fetch before issuing another
    pub throttle: Option<Duration>,
}

impl PollOptions {
    pub fn every(period: Duration) -> Self {
        Self {
            period,
            throttle: None,
        }
    }

    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = Some(throttle);
        self
    }
}

/// Published state of a poller
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot<T> {
    /// Last successfully fetched data, kept across failures
    pub data: Option<T>,
    /// Error of the latest fetch, cleared by the next success
    pub error: Option<PollError>,
    /// No fetch has completed yet
    pub loading: bool,
    /// Bumped every time `data` is replaced
    pub revision: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for PollSnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: true,
            revision: 0,
            updated_at: None,
        }
    }
}

impl<T> PollSnapshot<T> {
    /// Data is present but the latest fetch failed
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }
}

/// Handle of a running poller
///
/// Dropping the handle tears the poller down.
pub struct Poller<S: PollSource> {
    name: &'static str,
    params: watch::Sender<S::Params>,
    state: watch::Receiver<PollSnapshot<S::Output>>,
    task: JoinHandle<()>,
}

impl<S: PollSource> Poller<S> {
    /// Start polling; the first fetch is issued right away
    pub fn spawn(source: S, params: S::Params, options: PollOptions) -> Self {
        let name = source.name();
        info!(
            "🔄 Starting {} poller (every {}s{})",
            name,
            options.period.as_secs(),
            options
                .throttle
                .map(|t| format!(", throttle {}s", t.as_secs()))
                .unwrap_or_default()
        );

        let (params_tx, params_rx) = watch::channel(params);
        let (state_tx, state_rx) = watch::channel(PollSnapshot::default());
        let task = tokio::spawn(drive(Arc::new(source), params_rx, state_tx, options));

        Self {
            name,
            params: params_tx,
            state: state_rx,
            task,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current published state
    pub fn snapshot(&self) -> PollSnapshot<S::Output> {
        self.state.borrow().clone()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot<S::Output>> {
        self.state.clone()
    }

    pub fn params(&self) -> S::Params {
        self.params.borrow().clone()
    }

    /// Replace the parameters; returns `true` if they actually changed
    pub fn set_params(&self, params: S::Params) -> bool {
        self.params.send_if_modified(|current| {
            if *current == params {
                false
            } else {
                *current = params;
                true
            }
        })
    }

    /// Stop the poller; nothing is published once this returns
    pub async fn teardown(mut self) {
        self.task.abort();
        // cancellation error is the expected outcome
        let _ = (&mut self.task).await;
        debug!("🛑 {} poller torn down", self.name);
    }
}

impl<S: PollSource> Drop for Poller<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<S: PollSource> fmt::Debug for Poller<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("name", &self.name)
            .field("params", &*self.params.borrow())
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

struct Completion<T> {
    seq: u64,
    issued_at: Instant,
    result: Result<T, PollError>,
}

/// Bookkeeping owned by the driver task
#[derive(Debug, Default)]
struct PollState {
    issued: u64,
    last_success: Option<Instant>,
}

async fn drive<S: PollSource>(
    source: Arc<S>,
    mut params: watch::Receiver<S::Params>,
    state: watch::Sender<PollSnapshot<S::Output>>,
    options: PollOptions,
) {
    let started = Instant::now();
    let mut ticker = time::interval_at(started + options.period, options.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut in_flight: JoinSet<Completion<S::Output>> = JoinSet::new();
    let mut poll = PollState::default();

    let current = params.borrow_and_update().clone();
    issue(&source, current, &options, &mut poll, &mut in_flight, started);

    loop {
        tokio::select! {
            scheduled = ticker.tick() => {
                let current = params.borrow().clone();
                issue(&source, current, &options, &mut poll, &mut in_flight, scheduled);
            }
            changed = params.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = params.borrow_and_update().clone();
                debug!("{} params changed: {:?}", source.name(), current);
                let now = Instant::now();
                // a throttled change leaves the timer alone, the next tick picks it up
                if issue(&source, current, &options, &mut poll, &mut in_flight, now) {
                    ticker.reset_at(now + options.period);
                }
            }
            Some(joined) = in_flight.join_next() => match joined {
                Ok(completion) => apply(source.as_ref(), &state, &mut poll, completion),
                Err(e) => warn!("⚠️ {} fetch task failed: {}", source.name(), e),
            },
        }
    }
}

/// Start a fetch at `at` unless throttled; returns whether one was issued
///
/// `at` is the scheduled tick for timer fetches, so the throttle and the
/// period are measured on the same clock.
fn issue<S: PollSource>(
    source: &Arc<S>,
    params: S::Params,
    options: &PollOptions,
    poll: &mut PollState,
    in_flight: &mut JoinSet<Completion<S::Output>>,
    at: Instant,
) -> bool {
    if let (Some(throttle), Some(last_success)) = (options.throttle, poll.last_success) {
        let elapsed = at.saturating_duration_since(last_success);
        if elapsed < throttle {
            debug!(
                "⏳ {} fetch skipped, last success {}s ago",
                source.name(),
                elapsed.as_secs()
            );
            return false;
        }
    }

    poll.issued += 1;
    let seq = poll.issued;
    let source = Arc::clone(source);
    debug!("{} fetch #{} issued", source.name(), seq);

    in_flight.spawn(async move {
        let result = source.fetch(&params).await;
        Completion {
            seq,
            issued_at: at,
            result,
        }
    });
    true
}

fn apply<S: PollSource>(
    source: &S,
    state: &watch::Sender<PollSnapshot<S::Output>>,
    poll: &mut PollState,
    completion: Completion<S::Output>,
) {
    if completion.seq != poll.issued {
        debug!(
            "{} fetch #{} superseded by #{}, discarded",
            source.name(),
            completion.seq,
            poll.issued
        );
        return;
    }

    match completion.result {
        Ok(output) => {
            poll.last_success = Some(completion.issued_at);
            state.send_if_modified(|snapshot| {
                let mut modified = snapshot.loading || snapshot.error.is_some();
                snapshot.loading = false;
                snapshot.error = None;

                let unchanged = snapshot
                    .data
                    .as_ref()
                    .is_some_and(|previous| source.is_unchanged(previous, &output));
                if unchanged {
                    debug!("{} data unchanged", source.name());
                } else {
                    snapshot.data = Some(output);
                    snapshot.revision += 1;
                    snapshot.updated_at = Some(Utc::now());
                    modified = true;
                }
                modified
            });
        }
        Err(error) => {
            warn!("⚠️ {} fetch failed: {}", source.name(), error);
            state.send_modify(|snapshot| {
                snapshot.loading = false;
                snapshot.error = Some(error);
            });
        }
    }
}
