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

//! First-pass validation of history payloads
//!
//! Elements with an unparseable `time` or non-numeric metrics are dropped one
//! by one; the rest keep their relative order.

use matehome_types::{CanonicalReading, parse_timestamp};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{ApiError, ApiResult};

/// Validate the `data` array of a history response
pub fn validate_history(device_id: &str, data: Value) -> ApiResult<Vec<CanonicalReading>> {
    let Value::Array(elements) = data else {
        return Err(ApiError::InvalidResponse(
            "history data is not an array".to_owned(),
        ));
    };

    let total = elements.len();
    let readings: Vec<CanonicalReading> = elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| match validate_element(device_id, element) {
            Ok(reading) => Some(reading),
            Err(reason) => {
                warn!(index, %reason, "Dropping invalid history element");
                None
            }
        })
        .collect();

    debug!(
        device_id,
        original = total,
        validated = readings.len(),
        "History validated"
    );
    Ok(readings)
}

fn validate_element(device_id: &str, element: &Value) -> Result<CanonicalReading, String> {
    let raw_time = element
        .get("time")
        .and_then(Value::as_str)
        .ok_or("missing time")?;
    let time = parse_timestamp(raw_time).ok_or_else(|| format!("invalid time '{raw_time}'"))?;

    Ok(CanonicalReading {
        device_id: element
            .get("deviceId")
            .and_then(Value::as_str)
            .unwrap_or(device_id)
            .to_owned(),
        time,
        activity_seconds: metric(element, "activitySeconds")?,
        breath_seconds: metric(element, "breathSeconds")?,
    })
}

fn metric(element: &Value, field: &str) -> Result<f64, String> {
    element
        .get(field)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("{field} is not a finite number"))
}
