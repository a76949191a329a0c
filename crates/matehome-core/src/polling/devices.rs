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
use matehome_types::Device;

use super::{PollError, PollOptions, PollSource, Poller};
use crate::traits::DashboardApi;

/// All registered devices, replaced only when the list differs
pub struct DevicesSource {
    api: Arc<dyn DashboardApi>,
}

impl DevicesSource {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }
}

impl fmt::Debug for DevicesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevicesSource")
            .field("api", &self.api.name())
            .finish()
    }
}

#[async_trait]
impl PollSource for DevicesSource {
    type Params = ();
    type Output = Vec<Device>;

    fn name(&self) -> &'static str {
        "devices"
    }

    async fn fetch(&self, _params: &()) -> Result<Vec<Device>, PollError> {
        Ok(self.api.list_devices().await?)
    }

    fn is_unchanged(&self, previous: &Vec<Device>, next: &Vec<Device>) -> bool {
        previous == next
    }
}

pub fn spawn_devices_poller(api: Arc<dyn DashboardApi>, period: Duration) -> Poller<DevicesSource> {
    Poller::spawn(DevicesSource::new(api), (), PollOptions::every(period))
}
