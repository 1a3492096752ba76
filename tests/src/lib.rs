// Copyright (c) 2022-2023 The Skycoin Project

//! Tests for Skywallet device integration.
//!
//! [mock] provides a scripted device for host-side tests, the remaining
//! modules are device flows generic over [skywallet::Connect] for reuse
//! against the emulator or physical devices.
//!

pub mod mock;

pub mod responses;

pub mod wallet;

pub mod sign;

/// Setup logging for tests, level from `LOG_LEVEL` (default `info`)
pub fn setup() {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(log::LevelFilter::Info);

    let _ = simplelog::SimpleLogger::init(log_level, simplelog::Config::default());
}
