// Copyright (c) 2022-2023 The Skycoin Project

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use log::{debug, info, LevelFilter};
use strum::{Display, EnumString, EnumVariantNames};

use skywallet::{DeviceHandle, DeviceType, SessionConfig, SkywalletProvider, EMULATOR_ADDR};
use skywallet_proto::ButtonType;

/// Test CLI arguments
#[derive(Clone, Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub test: Tests,

    /// Target for test execution
    #[clap(long, value_enum, default_value = "emulator", env)]
    pub device_type: DeviceType,

    /// Emulator address
    #[clap(long, default_value_t = EMULATOR_ADDR, env)]
    pub emulator_addr: SocketAddr,

    /// bip39 Mnemonic loaded for wallet tests
    #[clap(long, env, value_parser = mnemonic_from_str)]
    pub mnemonic: String,

    /// Simulated button for emulator prompts
    #[clap(long, default_value = "right", value_parser = button_from_str, env)]
    pub auto_press: ButtonType,

    /// Log level
    #[clap(long, default_value = "debug", env)]
    pub log_level: LevelFilter,
}

pub fn mnemonic_from_str(s: &str) -> anyhow::Result<String> {
    let m = bip39::Mnemonic::from_phrase(s, bip39::Language::English)?;
    Ok(m.phrase().to_string())
}

pub fn button_from_str(s: &str) -> anyhow::Result<ButtonType> {
    Ok(s.parse()?)
}

/// Test modes
#[derive(Clone, PartialEq, Debug, Subcommand, Display, EnumString, EnumVariantNames)]
pub enum Tests {
    /// Wipe, load mnemonic and check features
    Wallet,
    /// Sign a message and check the signature
    Sign {
        /// Signing key index
        #[clap(long, default_value = "0")]
        address_n: u32,

        /// Message to sign
        #[clap(long, default_value = "hello skywallet")]
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load command line options
    let opts = Opts::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("hidapi");

    let _ = simplelog::SimpleLogger::init(opts.log_level, c.build());

    debug!("options: {:?}", opts);

    info!("Running test '{}' via {}", opts.test, opts.device_type);

    // Connect to target and execute test
    let p = SkywalletProvider::new(opts.device_type, opts.emulator_addr)?;
    let d = DeviceHandle::new(
        p,
        SessionConfig {
            auto_ack_buttons: true,
            auto_press: Some(opts.auto_press),
        },
    );

    use skywallet_tests::*;

    match &opts.test {
        Tests::Wallet => wallet::test(&d, &opts.mnemonic).await?,
        Tests::Sign { address_n, message } => sign::test(&d, *address_n, message).await?,
    }

    info!("Test OK!");

    Ok(())
}
