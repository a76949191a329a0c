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

use std::sync::Arc;

use anyhow::Context;
use matehome_client::ApiClient;
use matehome_core::DashboardApi;
use matehome_dashboard::{DashboardApp, DashboardConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("matehome_dashboard=info,matehome_core=info,matehome_client=info")
        }))
        .init();

    // matehome-dashboard [config.toml] [device-id]
    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let device_id = args.next().filter(|id| !id.trim().is_empty());

    let config = DashboardConfig::load(config_path.as_deref())?;
    let client = ApiClient::new(config.api.base_url.clone())
        .with_context(|| format!("Failed to create API client for {}", config.api.base_url))?;
    info!(base_url = %client.base_url(), "MATE HOME dashboard starting");

    let api: Arc<dyn DashboardApi> = Arc::new(client);
    let app = DashboardApp::start(api, &config, device_id);

    app.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
    })
    .await;

    info!("MATE HOME dashboard stopped");
    Ok(())
}
