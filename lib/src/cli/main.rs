// Copyright (c) 2022-2023 The Skycoin Project

//! Command line utility for interacting with Skywallet devices

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use log::{debug, info, LevelFilter};

use skywallet::{
    DeviceHandle, DeviceType, SessionConfig, SkywalletProvider, EMULATOR_ADDR,
};
use skywallet_proto::ButtonType;

mod helpers;
use helpers::*;

/// Skywallet command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Device type
    #[clap(long, value_enum, default_value = "usb", env)]
    device_type: DeviceType,

    /// Emulator address
    #[clap(long, default_value_t = EMULATOR_ADDR, env)]
    emulator_addr: SocketAddr,

    /// Simulate button presses following acknowledgements (emulator only)
    #[clap(long, value_parser = button_from_str, env)]
    auto_press: Option<ButtonType>,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

fn button_from_str(s: &str) -> anyhow::Result<ButtonType> {
    Ok(s.parse()?)
}

#[derive(Clone, PartialEq, Debug, Subcommand)]
#[non_exhaustive]
enum Actions {
    /// List available devices
    List,

    /// Check whether a device is connected and responding
    Connected,

    /// Fetch device features
    Features,

    /// Generate addresses
    Addresses {
        /// Number of addresses to generate
        #[clap(long, default_value = "1")]
        count: u32,

        /// Index of the first address
        #[clap(long, default_value = "0")]
        start_index: u32,

        /// Display addresses on the device for confirmation
        #[clap(long)]
        confirm: bool,
    },

    /// Sign a message
    SignMessage {
        /// Signing key index
        #[clap(long, default_value = "0")]
        address_n: u32,

        /// Message to sign
        message: String,
    },

    /// Check a message signature
    CheckSignature {
        /// Address expected to have produced the signature
        #[clap(long)]
        address: String,

        /// Hex encoded signature
        #[clap(long)]
        signature: HexData<65>,

        /// Signed message
        message: String,
    },

    /// Wipe the device
    Wipe,

    /// Cancel any pending device operation
    Cancel,

    /// Ping the device
    Ping {
        /// Message echoed by the device
        #[clap(default_value = "ping")]
        message: String,

        /// Require a button press before responding
        #[clap(long)]
        button_protection: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    c.add_filter_ignore_str("hidapi");

    let _ = simplelog::SimpleLogger::init(args.log_level, c.build());

    // Setup device provider
    let p = SkywalletProvider::new(args.device_type, args.emulator_addr)?;

    debug!("Using device type: {}", args.device_type);

    // Handle list command
    if args.cmd == Actions::List {
        let devices = p.list_devices();

        info!("Devices:");
        for (i, d) in devices.iter().enumerate() {
            info!("  {}: {}", i, d);
        }

        return Ok(());
    }

    let h = DeviceHandle::new(
        p,
        SessionConfig {
            auto_ack_buttons: false,
            auto_press: args.auto_press,
        },
    );

    // Execute command
    execute(&h, args.cmd).await
}

/// Execute a command against the provided device
async fn execute(h: &DeviceHandle<SkywalletProvider>, cmd: Actions) -> anyhow::Result<()> {
    debug!("Executing command: {:?}", cmd);

    let r = match cmd {
        Actions::Connected => {
            info!("Connected: {}", h.connected().await);
            return Ok(());
        }
        Actions::Features => h.features().await?,
        Actions::Addresses {
            count,
            start_index,
            confirm,
        } => h.address_gen(count, start_index, confirm).await?,
        Actions::SignMessage { address_n, message } => {
            h.sign_message(address_n, message).await?
        }
        Actions::CheckSignature {
            address,
            signature,
            message,
        } => {
            h.check_message_signature(address, message, signature.to_string())
                .await?
        }
        Actions::Wipe => h.wipe().await?,
        Actions::Cancel => h.cancel().await?,
        Actions::Ping {
            message,
            button_protection,
        } => h.ping(message, button_protection).await?,
        Actions::List => return Err(anyhow::anyhow!("list does not use a device session")),
    };

    // Answer any prompts then display the outcome
    let o = complete(h, r).await?;

    show(o)
}
