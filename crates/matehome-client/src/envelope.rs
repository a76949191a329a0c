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

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{ApiError, ApiResult};

/// Uniform response wrapper of the backend: `{ success, data, error? }`
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiResponse {
    /// Raw `data` payload, or `RequestFailed` with the server message
    pub fn into_value(self) -> ApiResult<Value> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::RequestFailed(
                self.error
                    .unwrap_or_else(|| "Server reported failure without a message".to_owned()),
            ))
        }
    }

    pub fn into_data<T: DeserializeOwned>(self) -> ApiResult<T> {
        Ok(serde_json::from_value(self.into_value()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: Value) -> ApiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_success_unwraps_data() {
        let data: Vec<u32> = envelope(json!({ "success": true, "data": [1, 2, 3] }))
            .into_data()
            .unwrap();
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_failure_carries_server_message() {
        let err = envelope(json!({ "success": false, "error": "database offline" }))
            .into_data::<Value>()
            .unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed(ref m) if m == "database offline"));
    }

    #[test]
    fn test_missing_data_fits_unit() {
        let unit: ApiResult<()> = envelope(json!({ "success": true })).into_data();
        assert!(unit.is_ok());
    }

    #[test]
    fn test_mismatched_data_is_json_error() {
        let err = envelope(json!({ "success": true, "data": "nope" }))
            .into_data::<Vec<u32>>()
            .unwrap_err();
        assert!(matches!(err, ApiError::JsonError(_)));
    }
}
