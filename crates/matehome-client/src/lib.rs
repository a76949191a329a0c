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

//! REST client of the MATE HOME sensor backend
//!
//! Every endpoint answers with the `{ success, data, error? }` envelope. The
//! client unwraps it, validates history payloads and logs each failure
//! before handing it back to the caller.

pub mod client;
pub mod envelope;
pub mod errors;
pub mod validation;

pub use client::{ApiClient, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use errors::{ApiError, ApiResult, ErrorKind};
