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
use matehome_types::{Device, QueryError};

use super::{PollError, PollOptions, PollSource, Poller};
use crate::traits::DashboardApi;

/// One device by id, for the detail view
pub struct DeviceSource {
    api: Arc<dyn DashboardApi>,
}

impl DeviceSource {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }
}

impl fmt::Debug for DeviceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSource")
            .field("api", &self.api.name())
            .finish()
    }
}

#[async_trait]
impl PollSource for DeviceSource {
    type Params = String;
    type Output = Device;

    fn name(&self) -> &'static str {
        "device"
    }

    async fn fetch(&self, id: &String) -> Result<Device, PollError> {
        if id.trim().is_empty() {
            return Err(QueryError::MissingDeviceId.into());
        }
        Ok(self.api.get_device(id).await?)
    }

    fn is_unchanged(&self, previous: &Device, next: &Device) -> bool {
        previous == next
    }
}

pub fn spawn_device_poller(
    api: Arc<dyn DashboardApi>,
    id: impl Into<String>,
    period: Duration,
) -> Poller<DeviceSource> {
    Poller::spawn(DeviceSource::new(api), id.into(), PollOptions::every(period))
}
