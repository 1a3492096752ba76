// Copyright (c) 2022-2023 The Skycoin Project

//! Daemon configuration

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use skywallet::{DeviceType, SessionConfig, EMULATOR_ADDR};
use skywallet_proto::ButtonType;

/// Default daemon port
pub const DEFAULT_PORT: u16 = 9510;

/// Skywallet daemon, exposes hardware wallets to local applications over HTTP
#[derive(Clone, PartialEq, Debug, Parser)]
pub struct Config {
    /// Device type
    #[clap(long, value_enum, default_value = "usb", env)]
    pub device_type: DeviceType,

    /// Address to bind the HTTP server
    #[clap(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST), env)]
    pub host: IpAddr,

    /// Port to bind the HTTP server
    #[clap(long, default_value_t = DEFAULT_PORT, env)]
    pub port: u16,

    /// Emulator address
    #[clap(long, default_value_t = EMULATOR_ADDR, env)]
    pub emulator_addr: SocketAddr,

    /// Simulate a button press following each acknowledgement (emulator only)
    #[clap(long, value_enum, default_value = "none", env)]
    pub auto_press: AutoPress,

    /// Surface button requests to the caller instead of acknowledging them
    #[clap(long, env)]
    pub caller_button_ack: bool,

    /// Timeout for device requests, requests exceeding this are disconnected
    #[clap(long, default_value = "300", env)]
    pub request_timeout_s: u64,

    /// Allowed CORS origins (localhost origins are always allowed)
    #[clap(long, env, value_delimiter = ',')]
    pub allowed_origin: Vec<String>,

    /// Log level
    #[clap(long, default_value = "info", env)]
    pub log_level: LevelFilter,
}

/// Emulator button press simulation
#[derive(Copy, Clone, PartialEq, Debug, ValueEnum)]
pub enum AutoPress {
    None,
    Left,
    Right,
    Both,
}

impl AutoPress {
    /// Fetch the simulated button (if enabled)
    pub fn button(&self) -> Option<ButtonType> {
        match self {
            AutoPress::None => None,
            AutoPress::Left => Some(ButtonType::Left),
            AutoPress::Right => Some(ButtonType::Right),
            AutoPress::Both => Some(ButtonType::Both),
        }
    }
}

impl Config {
    /// Fetch the HTTP bind address
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Fetch device session options
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            auto_ack_buttons: !self.caller_button_ack,
            auto_press: self.auto_press.button(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s)
    }
}
