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

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use matehome_types::{CanonicalReading, Device};

use super::{PollError, PollOptions, PollSource, Poller};
use crate::traits::DashboardApi;

/// Device list joined with the latest reading of each device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub devices: Vec<Device>,
    pub readings: BTreeMap<String, CanonicalReading>,
}

impl Overview {
    pub fn reading_for(&self, device_id: &str) -> Option<&CanonicalReading> {
        self.readings.get(device_id)
    }
}

/// Devices and current readings fetched concurrently
pub struct OverviewSource {
    api: Arc<dyn DashboardApi>,
}

impl OverviewSource {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }
}

impl fmt::Debug for OverviewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverviewSource")
            .field("api", &self.api.name())
            .finish()
    }
}

#[async_trait]
impl PollSource for OverviewSource {
    type Params = ();
    type Output = Overview;

    fn name(&self) -> &'static str {
        "overview"
    }

    async fn fetch(&self, _params: &()) -> Result<Overview, PollError> {
        let (devices, readings) =
            tokio::try_join!(self.api.list_devices(), self.api.get_current_readings())?;
        Ok(Overview { devices, readings })
    }

    fn is_unchanged(&self, previous: &Overview, next: &Overview) -> bool {
        previous == next
    }
}

pub fn spawn_overview_poller(api: Arc<dyn DashboardApi>, period: Duration) -> Poller<OverviewSource> {
    Poller::spawn(OverviewSource::new(api), (), PollOptions::every(period))
}
