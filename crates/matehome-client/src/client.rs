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

use chrono::{DateTime, NaiveDate, Utc};
use matehome_types::{
    CanonicalReading, CurrentReading, DailyStats, Device, DeviceReadingItem, HistoryQuery,
    RawLegacyReading, TimeWindow,
};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, trace};

use crate::envelope::ApiResponse;
use crate::errors::{ApiError, ApiResult};
use crate::validation::validate_history;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const BASE_URL_ENV: &str = "MATEHOME_API_URL";

/// REST client of the sensor backend
///
/// Requests carry no timeout and are never retried; a failed call is
/// reported once and the pollers decide what to keep.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(ApiError::ConfigError("API base URL is empty".to_owned()));
        }

        Ok(Self { base_url, client })
    }

    /// Create client from `MATEHOME_API_URL`, falling back to the local backend
    pub fn from_env() -> ApiResult<Self> {
        Self::from_config(None)
    }

    /// Create client from a configured base URL
    /// Falls back to the environment variable, then to the local backend
    pub fn from_config(base_url: Option<String>) -> ApiResult<Self> {
        let base_url = base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        info!("Initializing dashboard API client: {}", base_url);
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List all registered devices
    pub async fn list_devices(&self) -> ApiResult<Vec<Device>> {
        let url = format!("{}/api/devices", self.base_url);
        debug!("🔍 [API QUERY] Listing devices");

        let devices: Vec<Device> = self
            .fetch(self.client.get(&url), "device list")
            .await
            .inspect_err(|e| error!("❌ [API ERROR] Failed to list devices: {}", e))?;

        debug!("✅ [API RESULT] {} devices", devices.len());
        Ok(devices)
    }

    /// Get one device by id
    pub async fn get_device(&self, id: &str) -> ApiResult<Device> {
        let url = format!("{}/api/devices/{}", self.base_url, urlencoding::encode(id));
        debug!("🔍 [API QUERY] Getting device: {}", id);

        let device: Device = self
            .fetch(self.client.get(&url), &format!("device {id}"))
            .await
            .inspect_err(|e| error!("❌ [API ERROR] Failed to get device {}: {}", id, e))?;

        debug!("✅ [API RESULT] Device {} is {:?}", device.id, device.status);
        Ok(device)
    }

    /// Latest reading of every device, renamed into canonical shape
    pub async fn get_current_readings(&self) -> ApiResult<BTreeMap<String, CanonicalReading>> {
        let url = format!("{}/api/devices/readings/current", self.base_url);
        debug!("🔍 [API QUERY] Getting current readings");

        let current: BTreeMap<String, CurrentReading> = self
            .fetch(self.client.get(&url), "current readings")
            .await
            .inspect_err(|e| error!("❌ [API ERROR] Failed to get current readings: {}", e))?;

        let readings: BTreeMap<String, CanonicalReading> = current
            .into_iter()
            .map(|(id, reading)| (id, CanonicalReading::from(reading)))
            .collect();

        debug!("✅ [API RESULT] Current readings for {} devices", readings.len());
        Ok(readings)
    }

    /// Time-bounded reading series of one device
    ///
    /// The query is validated before any request is made. Elements with an
    /// unparseable `time` or non-finite metrics are dropped from the result.
    pub async fn get_history(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        window: Option<TimeWindow>,
    ) -> ApiResult<Vec<CanonicalReading>> {
        let query = HistoryQuery::new(device_id, start, end, window).inspect_err(|e| {
            error!("❌ [API ERROR] Rejected history query for '{}': {}", device_id, e);
        })?;
        self.fetch_history(&query).await
    }

    /// History fetch for an already validated query
    pub async fn fetch_history(&self, query: &HistoryQuery) -> ApiResult<Vec<CanonicalReading>> {
        let device_id = query.device_id();
        let url = format!(
            "{}/api/history/{}",
            self.base_url,
            urlencoding::encode(device_id)
        );
        info!(
            "📊 [API HISTORY] Fetching {} history ({} .. {}, window {})",
            device_id,
            query.start(),
            query.end(),
            query.window()
        );

        let response = self
            .envelope(
                self.client.get(&url).query(&query.query_params()),
                &format!("history of {device_id}"),
            )
            .await
            .inspect_err(|e| error!("❌ [API HISTORY] Request for {} failed: {}", device_id, e))?;

        let readings = response
            .into_value()
            .and_then(|data| validate_history(device_id, data))
            .inspect_err(|e| error!("❌ [API HISTORY] Bad payload for {}: {}", device_id, e))?;

        info!(
            "✅ [API HISTORY] Retrieved {} readings for {}",
            readings.len(),
            device_id
        );
        Ok(readings)
    }

    /// Aggregate statistics of one device for one calendar date
    pub async fn get_daily_stats(&self, device_id: &str, date: NaiveDate) -> ApiResult<DailyStats> {
        let url = format!(
            "{}/api/history/{}/daily",
            self.base_url,
            urlencoding::encode(device_id)
        );
        let date = date.format("%Y-%m-%d").to_string();
        debug!("🔍 [API QUERY] Daily stats for {} on {}", device_id, date);

        self.fetch(
            self.client.get(&url).query(&[("date", date.as_str())]),
            &format!("daily stats of {device_id}"),
        )
        .await
        .inspect_err(|e| {
            error!(
                "❌ [API ERROR] Failed to get daily stats for {} on {}: {}",
                device_id, date, e
            );
        })
    }

    /// Ask the backend to generate synthetic history for a device
    pub async fn generate_test_data(&self, device_id: &str) -> ApiResult<()> {
        let url = format!(
            "{}/api/history/{}/test",
            self.base_url,
            urlencoding::encode(device_id)
        );
        info!("🧪 [API TEST DATA] Requesting test data for {}", device_id);

        self.envelope(self.client.post(&url), &format!("test data of {device_id}"))
            .await
            .and_then(ApiResponse::into_value)
            .inspect_err(|e| {
                error!(
                    "❌ [API TEST DATA] Generation failed for {}: {}",
                    device_id, e
                );
            })?;

        info!("✅ [API TEST DATA] Generated for {}", device_id);
        Ok(())
    }

    /// Raw legacy readings, for one device or for all of them
    pub async fn get_device_readings(
        &self,
        device_id: Option<&str>,
    ) -> ApiResult<Vec<RawLegacyReading>> {
        let url = match device_id {
            Some(id) => format!(
                "{}/api/devices/{}/readings",
                self.base_url,
                urlencoding::encode(id)
            ),
            None => format!("{}/api/devices/readings", self.base_url),
        };
        let label = device_id.unwrap_or("all devices");
        debug!("🔍 [API QUERY] Getting legacy readings for {}", label);

        let items: Vec<DeviceReadingItem> = self
            .fetch(self.client.get(&url), &format!("readings of {label}"))
            .await
            .inspect_err(|e| {
                error!("❌ [API ERROR] Failed to get readings for {}: {}", label, e);
            })?;

        debug!("✅ [API RESULT] {} legacy readings for {}", items.len(), label);
        Ok(items.into_iter().map(|item| item.reading).collect())
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> ApiResult<T> {
        self.envelope(request, what).await?.into_data()
    }

    /// Send a request and decode the response envelope
    async fn envelope(&self, request: RequestBuilder, what: &str) -> ApiResult<ApiResponse> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let envelope = response.json::<ApiResponse>().await?;
                trace!("   Envelope for {}: success={}", what, envelope.success);
                Ok(envelope)
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(what.to_owned())),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiResponse>(&error_text)
                    .ok()
                    .and_then(|envelope| envelope.error)
                    .unwrap_or(error_text);
                Err(ApiError::ApiError {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use matehome_types::QueryError;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://backend:3001/").unwrap();
        assert_eq!(client.base_url(), "http://backend:3001");
        assert!(matches!(
            ApiClient::new(""),
            Err(ApiError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_list_devices_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/devices")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "data": [
                        { "id": "DEV1", "name": "Bagno", "status": "ONLINE", "lastUpdate": "2024-01-01T00:00:00Z" },
                        { "id": "DEV2", "name": "Camera", "status": "OFFLINE", "lastUpdate": "2024-01-01T00:00:00Z" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let devices = client.list_devices().await.unwrap();

        assert_eq!(devices.len(), 2);
        assert!(devices[0].is_online());
        assert!(!devices[1].is_online());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_envelope_failure_carries_server_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/devices")
            .with_status(200)
            .with_body(json!({ "success": false, "error": "database offline" }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.list_devices().await.unwrap_err();

        assert!(matches!(err, ApiError::RequestFailed(ref m) if m == "database offline"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/devices")
            .with_status(500)
            .with_body(json!({ "success": false, "error": "boom" }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.list_devices().await.unwrap_err();

        assert!(matches!(
            err,
            ApiError::ApiError { status: 500, ref message } if message == "boom"
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_device_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/devices/DEV9")
            .with_status(404)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client.get_device("DEV9").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.kind(), crate::ErrorKind::RequestFailed);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_current_readings_shape_rename() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/devices/readings/current")
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "DEV1": {
                            "deviceId": "DEV1",
                            "timestamp": "2024-01-01T00:00:00Z",
                            "activity": { "all": 12, "breath": 4 }
                        }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let readings = client.get_current_readings().await.unwrap();

        assert_eq!(
            serde_json::to_value(&readings).unwrap(),
            json!({
                "DEV1": {
                    "deviceId": "DEV1",
                    "time": "2024-01-01T00:00:00.000Z",
                    "activitySeconds": 12.0,
                    "breathSeconds": 4.0
                }
            })
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_history_drops_invalid_elements() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/history/DEV1")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start".into(), "2024-01-01T00:00:00.000Z".into()),
                Matcher::UrlEncoded("end".into(), "2024-01-01T01:00:00.000Z".into()),
                Matcher::UrlEncoded("window".into(), "1h".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": [
                        { "deviceId": "DEV1", "time": "2024-01-01T00:10:00Z", "activitySeconds": 3, "breathSeconds": 1 },
                        { "deviceId": "DEV1", "time": "2024-01-01T00:20:00Z", "activitySeconds": "NaN", "breathSeconds": 1 },
                        { "deviceId": "DEV1", "time": "2024-01-01T00:30:00Z", "activitySeconds": 9, "breathSeconds": 2 }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let readings = client
            .get_history("DEV1", ts(0, 0), ts(1, 0), None)
            .await
            .unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].time, ts(0, 10));
        assert_eq!(readings[1].time, ts(0, 30));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_history_non_array_is_invalid_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/history/DEV1")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "success": true, "data": { "rows": [] } }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let err = client
            .get_history("DEV1", ts(0, 0), ts(1, 0), Some(TimeWindow::SixHours))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::ValidationFailed);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_history_rejects_input_without_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();

        let missing = client.get_history("", ts(0, 0), ts(1, 0), None).await;
        assert!(matches!(
            missing,
            Err(ApiError::InputInvalid(QueryError::MissingDeviceId))
        ));

        let inverted = client.get_history("DEV1", ts(1, 0), ts(0, 0), None).await;
        assert!(matches!(
            inverted,
            Err(ApiError::InputInvalid(QueryError::InvertedRange { .. }))
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_daily_stats_passthrough() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/history/DEV1/daily")
            .match_query(Matcher::UrlEncoded("date".into(), "2024-01-01".into()))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "date": "2024-01-01",
                        "averageActivity": 10.5,
                        "maxActivity": 40,
                        "averageBreath": 3.5,
                        "maxBreath": 9,
                        "activeHours": 6
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let stats = client.get_daily_stats("DEV1", date).await.unwrap();

        assert_eq!(stats.average_activity, 10.5);
        assert_eq!(stats.max_breath, 9.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_test_data() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("POST", "/api/history/DEV1/test")
            .with_status(200)
            .with_body(json!({ "success": true }).to_string())
            .create_async()
            .await;
        let failed = server
            .mock("POST", "/api/history/DEV2/test")
            .with_status(200)
            .with_body(json!({ "success": false }).to_string())
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        assert!(client.generate_test_data("DEV1").await.is_ok());
        assert!(matches!(
            client.generate_test_data("DEV2").await,
            Err(ApiError::RequestFailed(_))
        ));

        ok.assert_async().await;
        failed.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_device_readings_unwraps_items() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/devices/DEV1/readings")
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": [
                        {
                            "reading": {
                                "sname": { "S": "bagno" },
                                "ts": { "S": "2024-01-01T00:00:00Z" },
                                "Activity": { "M": { "activity": { "M": {
                                    "all": { "L": [ { "N": "12" } ] },
                                    "breath": { "L": [ { "N": "4" } ] }
                                } } } }
                            }
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).unwrap();
        let readings = client.get_device_readings(Some("DEV1")).await.unwrap();

        assert_eq!(readings.len(), 1);
        assert_eq!(
            readings[0]
                .get("sname")
                .and_then(matehome_types::AttributeValue::as_s),
            Some("bagno")
        );
        mock.assert_async().await;
    }
}
