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
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use matehome_types::history::to_iso;
use matehome_types::{CanonicalReading, HistoryQuery, TimeRange};

use super::{PollError, PollOptions, PollSource, Poller};
use crate::normalizer::sanitize_history;
use crate::traits::DashboardApi;

/// Caller-facing history parameters, validated on every fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryParams {
    pub device_id: Option<String>,
    pub start: String,
    pub end: String,
    pub window: Option<String>,
    /// When set, `start` and `end` are recomputed from this range at every fetch
    pub range: Option<TimeRange>,
}

impl HistoryParams {
    /// Fixed bounds covering `range` up to `now`
    pub fn for_range<Tz: TimeZone>(
        device_id: Option<String>,
        range: TimeRange,
        now: &DateTime<Tz>,
    ) -> Self {
        let start = range.start_at(now).with_timezone(&Utc);
        Self {
            device_id,
            start: to_iso(start),
            end: to_iso(now.with_timezone(&Utc)),
            window: Some(range.window().as_str().to_owned()),
            range: None,
        }
    }

    /// Window that follows `range` up to the moment each fetch is issued
    pub fn sliding(device_id: Option<String>, range: TimeRange) -> Self {
        Self {
            device_id,
            window: Some(range.window().as_str().to_owned()),
            range: Some(range),
            ..Self::default()
        }
    }

    /// Concrete bounds for a fetch issued at `now`
    pub fn resolve<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Self {
        match self.range {
            Some(range) => Self::for_range(self.device_id.clone(), range, now),
            None => self.clone(),
        }
    }
}

/// Device history, throttled against the last successful fetch
pub struct HistorySource {
    api: Arc<dyn DashboardApi>,
}

impl HistorySource {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }
}

impl fmt::Debug for HistorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistorySource")
            .field("api", &self.api.name())
            .finish()
    }
}

#[async_trait]
impl PollSource for HistorySource {
    type Params = HistoryParams;
    type Output = Vec<CanonicalReading>;

    fn name(&self) -> &'static str {
        "history"
    }

    async fn fetch(&self, params: &HistoryParams) -> Result<Vec<CanonicalReading>, PollError> {
        let params = params.resolve(&Local::now());
        let query = HistoryQuery::parse(
            params.device_id.as_deref(),
            &params.start,
            &params.end,
            params.window.as_deref(),
        )?;
        let readings = self.api.get_history(&query).await?;
        Ok(sanitize_history(readings))
    }
}

pub fn spawn_history_poller(
    api: Arc<dyn DashboardApi>,
    params: HistoryParams,
    period: Duration,
    throttle: Duration,
) -> Poller<HistorySource> {
    Poller::spawn(
        HistorySource::new(api),
        params,
        PollOptions::every(period).with_throttle(throttle),
    )
}
