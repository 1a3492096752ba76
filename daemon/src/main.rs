// Copyright (c) 2022-2023 The Skycoin Project

//! Skywallet daemon binary

use clap::Parser;
use log::{debug, info};
use tokio::net::TcpListener;

use skywallet::{DeviceHandle, SkywalletProvider};
use skywallet_daemon::{config::Config, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let config = Config::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("hidapi")
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("tower_http");

    let _ = simplelog::SimpleLogger::init(config.log_level, c.build());

    debug!("Using config: {:?}", config);

    // Setup device handle
    let p = SkywalletProvider::new(config.device_type, config.emulator_addr)?;
    let h = DeviceHandle::new(p, config.session());

    let state = AppState::new(h, config.request_timeout());
    let app = router(state, &config.allowed_origin);

    // Bind and serve until interrupted
    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;

    info!(
        "Listening on http://{}/api/v1 (device: {})",
        addr, config.device_type
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
