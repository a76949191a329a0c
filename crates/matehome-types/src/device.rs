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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reading::ActivityPair;

/// Connectivity of a radar unit as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceStatus {
    #[serde(alias = "online")]
    Online,
    #[serde(alias = "offline")]
    Offline,
}

impl DeviceStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// Activity snapshot some backends embed in the device record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceLastReading {
    pub activity: ActivityPair,
}

/// A physical radar sensor unit
///
/// Devices are fetched wholesale on each poll and never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Opaque identifier, the join key across readings
    pub id: String,
    /// Room label ("bagno", "soggiorno", "camera", ...)
    pub name: String,
    pub status: DeviceStatus,
    /// Last heartbeat or reading seen by the backend
    pub last_update: DateTime<Utc>,
    /// Hardware family, "RADAR" for every unit seen so far
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reading: Option<DeviceLastReading>,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }

    /// Case-insensitive match of the room label
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
