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

use matehome_types::QueryError;
use thiserror::Error;

/// How a failure is surfaced to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport failure or rejected envelope, shown as a notification
    RequestFailed,
    /// Malformed data; single elements are filtered silently
    ValidationFailed,
    /// Bad caller input, caught before any request is sent
    InputInvalid,
}

/// Dashboard API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned error status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InputInvalid(#[from] QueryError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HttpError(_)
            | Self::ApiError { .. }
            | Self::RequestFailed(_)
            | Self::NotFound(_)
            | Self::JsonError(_)
            | Self::ConfigError(_) => ErrorKind::RequestFailed,
            Self::InvalidResponse(_) => ErrorKind::ValidationFailed,
            Self::InputInvalid(_) => ErrorKind::InputInvalid,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
