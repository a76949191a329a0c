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

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use matehome_client::{BASE_URL_ENV, DEFAULT_BASE_URL};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    #[serde(default)]
    pub rooms: RoomSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingSettings {
    #[serde(default = "default_devices_interval_secs")]
    pub devices_interval_secs: u64,
    #[serde(default = "default_device_interval_secs")]
    pub device_interval_secs: u64,
    #[serde(default = "default_device_data_interval_secs")]
    pub device_data_interval_secs: u64,
    #[serde(default = "default_history_interval_secs")]
    pub history_interval_secs: u64,
    #[serde(default = "default_history_throttle_secs")]
    pub history_throttle_secs: u64,
    #[serde(default = "default_overview_interval_secs")]
    pub overview_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomSettings {
    /// Room labels shown on the home screen
    #[serde(default = "default_featured_rooms")]
    pub featured: Vec<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_devices_interval_secs() -> u64 {
    30
}

fn default_device_interval_secs() -> u64 {
    5
}

fn default_device_data_interval_secs() -> u64 {
    30
}

fn default_history_interval_secs() -> u64 {
    30
}

fn default_history_throttle_secs() -> u64 {
    30
}

fn default_overview_interval_secs() -> u64 {
    60
}

fn default_featured_rooms() -> Vec<String> {
    vec!["bagno".to_owned(), "camera".to_owned()]
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            devices_interval_secs: default_devices_interval_secs(),
            device_interval_secs: default_device_interval_secs(),
            device_data_interval_secs: default_device_data_interval_secs(),
            history_interval_secs: default_history_interval_secs(),
            history_throttle_secs: default_history_throttle_secs(),
            overview_interval_secs: default_overview_interval_secs(),
        }
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            featured: default_featured_rooms(),
        }
    }
}

impl PollingSettings {
    pub fn devices_period(&self) -> Duration {
        Duration::from_secs(self.devices_interval_secs)
    }

    pub fn device_period(&self) -> Duration {
        Duration::from_secs(self.device_interval_secs)
    }

    pub fn device_data_period(&self) -> Duration {
        Duration::from_secs(self.device_data_interval_secs)
    }

    pub fn history_period(&self) -> Duration {
        Duration::from_secs(self.history_interval_secs)
    }

    pub fn history_throttle(&self) -> Duration {
        Duration::from_secs(self.history_throttle_secs)
    }

    pub fn overview_period(&self) -> Duration {
        Duration::from_secs(self.overview_interval_secs)
    }
}

impl DashboardConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults; then apply
    /// `MATEHOME_API_URL` and validate
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path, "Loading configuration");
                Self::from_file(path)?
            }
            None => {
                info!("No config file given, using defaults");
                Self::default()
            }
        };
        config.override_base_url(std::env::var(BASE_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn override_base_url(&mut self, base_url: Option<String>) {
        if let Some(base_url) = base_url.filter(|url| !url.trim().is_empty()) {
            info!(base_url = %base_url, "API base URL overridden by {}", BASE_URL_ENV);
            self.api.base_url = base_url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            bail!("api.base_url must be an http(s) URL, got '{base_url}'");
        }

        let intervals = [
            ("polling.devices_interval_secs", self.polling.devices_interval_secs),
            ("polling.device_interval_secs", self.polling.device_interval_secs),
            (
                "polling.device_data_interval_secs",
                self.polling.device_data_interval_secs,
            ),
            ("polling.history_interval_secs", self.polling.history_interval_secs),
            ("polling.overview_interval_secs", self.polling.overview_interval_secs),
        ];
        for (field, secs) in intervals {
            if secs == 0 {
                bail!("{field} must be at least 1 second");
            }
        }

        if self.rooms.featured.iter().any(|name| name.trim().is_empty()) {
            bail!("rooms.featured must not contain empty names");
        }
        Ok(())
    }
}
