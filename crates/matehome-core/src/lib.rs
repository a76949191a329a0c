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

//! Data pipeline of the MATE HOME dashboard
//!
//! Legacy reading normalization, the periodic pollers that keep the screens
//! fed, and the derived summaries the screens display.

pub mod normalizer;
pub mod polling;
pub mod summary;
pub mod traits;

pub use normalizer::{ChangeKey, LegacyDeviceInfo, NormalizedReading, normalize};
pub use polling::{PollError, PollOptions, PollSnapshot, PollSource, Poller};
pub use summary::{ActivityLevel, DashboardSummary, RoomKind, SeriesStats};
pub use traits::DashboardApi;
