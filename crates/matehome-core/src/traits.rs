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

use async_trait::async_trait;
use matehome_client::{ApiClient, ApiResult};
use matehome_types::{CanonicalReading, Device, HistoryQuery, RawLegacyReading};

/// Backend operations the pollers depend on
///
/// Implemented by [`ApiClient`]; tests plug in scripted fakes.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn list_devices(&self) -> ApiResult<Vec<Device>>;

    async fn get_device(&self, id: &str) -> ApiResult<Device>;

    /// Latest canonical reading per device id
    async fn get_current_readings(&self) -> ApiResult<BTreeMap<String, CanonicalReading>>;

    /// History series for an already validated query
    async fn get_history(&self, query: &HistoryQuery) -> ApiResult<Vec<CanonicalReading>>;

    /// Legacy-encoded readings, for one device or all of them
    async fn get_device_readings(&self, device_id: Option<&str>)
    -> ApiResult<Vec<RawLegacyReading>>;

    /// Get data source name for logging
    fn name(&self) -> &str;
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn list_devices(&self) -> ApiResult<Vec<Device>> {
        ApiClient::list_devices(self).await
    }

    async fn get_device(&self, id: &str) -> ApiResult<Device> {
        ApiClient::get_device(self, id).await
    }

    async fn get_current_readings(&self) -> ApiResult<BTreeMap<String, CanonicalReading>> {
        ApiClient::get_current_readings(self).await
    }

    async fn get_history(&self, query: &HistoryQuery) -> ApiResult<Vec<CanonicalReading>> {
        self.fetch_history(query).await
    }

    async fn get_device_readings(
        &self,
        device_id: Option<&str>,
    ) -> ApiResult<Vec<RawLegacyReading>> {
        ApiClient::get_device_readings(self, device_id).await
    }

    fn name(&self) -> &str {
        self.base_url()
    }
}
