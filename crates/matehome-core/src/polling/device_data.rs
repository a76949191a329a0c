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

use super::{PollError, PollOptions, PollSource, Poller};
use crate::normalizer::{self, NormalizedReading};
use crate::traits::DashboardApi;

/// Legacy readings of one device (or of all devices), normalized
///
/// A new poll replaces the data only when the raw activity tokens of the
/// first reading differ from the previous poll.
pub struct DeviceDataSource {
    api: Arc<dyn DashboardApi>,
}

impl DeviceDataSource {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }
}

impl fmt::Debug for DeviceDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceDataSource")
            .field("api", &self.api.name())
            .finish()
    }
}

#[async_trait]
impl PollSource for DeviceDataSource {
    type Params = Option<String>;
    type Output = Vec<NormalizedReading>;

    fn name(&self) -> &'static str {
        "device data"
    }

    async fn fetch(&self, device_id: &Option<String>) -> Result<Vec<NormalizedReading>, PollError> {
        let raw = self.api.get_device_readings(device_id.as_deref()).await?;
        Ok(normalizer::normalize_all(&raw))
    }

    fn is_unchanged(&self, previous: &Vec<NormalizedReading>, next: &Vec<NormalizedReading>) -> bool {
        normalizer::is_unchanged(previous, next)
    }
}

pub fn spawn_device_data_poller(
    api: Arc<dyn DashboardApi>,
    device_id: Option<String>,
    period: Duration,
) -> Poller<DeviceDataSource> {
    Poller::spawn(
        DeviceDataSource::new(api),
        device_id,
        PollOptions::every(period),
    )
}
