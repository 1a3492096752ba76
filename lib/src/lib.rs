// Copyright (c) 2022-2023 The Skycoin Project

//! Skywallet hardware wallet API Library (and CLI)
//!
//! [DeviceHandle] provides exclusive, cancellable access to a single
//! device, connecting per operation via a type implementing [Connect].
//! [SkywalletProvider] connects to USB HID devices or the UDP emulator.

use std::{
    fmt::Debug,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
};

use async_trait::async_trait;
use log::debug;

/// Re-export transports for consumer use
pub mod transport;
use transport::*;

/// Re-export protocol and engine crates for consumers
pub use skywallet_core::engine;
pub use skywallet_proto::{self as proto};

mod handle;
pub use handle::{DeviceHandle, Pending, Reply, Session, SessionConfig};

mod error;
pub use error::Error;

/// Default emulator address
pub const EMULATOR_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 21324));

/// Device type selector
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeviceType {
    /// Physical device via USB HID
    Usb,
    /// Emulator via UDP
    Emulator,
}

/// Connect trait for supported transports
///
/// Connectors hold their own options, a new [Channel] is created for each operation.
#[async_trait]
pub trait Connect: Send + Sync + 'static {
    type Channel: Channel + 'static;

    /// Connect to the configured device
    async fn connect(&self) -> Result<Self::Channel, Error>;

    /// Check whether a device is present (without connecting)
    async fn available(&self) -> bool;

    /// Fetch the configured device type
    fn device_type(&self) -> DeviceType;
}

/// Skywallet provider manages device discovery and connections
pub struct SkywalletProvider {
    device_type: DeviceType,
    emulator_addr: SocketAddr,
    #[cfg(feature = "transport_hid")]
    hid_api: Option<std::sync::Mutex<hidapi::HidApi>>,
}

/// Skywallet device information for listing
#[derive(Debug)]
pub enum DeviceInfo {
    #[cfg(feature = "transport_hid")]
    Usb(hidapi::DeviceInfo),
    Emulator(SocketAddr),
}

impl SkywalletProvider {
    /// Create a new provider for the specified device type
    ///
    /// NOTE: only one USB provider may exist at a time (global HID context)
    pub fn new(device_type: DeviceType, emulator_addr: SocketAddr) -> Result<Self, Error> {
        #[cfg(feature = "transport_hid")]
        let hid_api = match device_type {
            DeviceType::Usb => Some(std::sync::Mutex::new(
                hidapi::HidApi::new().map_err(|_| Error::HidInit)?,
            )),
            DeviceType::Emulator => None,
        };

        Ok(Self {
            device_type,
            emulator_addr,
            #[cfg(feature = "transport_hid")]
            hid_api,
        })
    }

    /// List available devices of the configured type
    pub fn list_devices(&self) -> Vec<DeviceInfo> {
        let mut devices = vec![];

        match self.device_type {
            #[cfg(feature = "transport_hid")]
            DeviceType::Usb => {
                if let Some(api) = &self.hid_api {
                    devices.extend(UsbChannel::list(api).into_iter().map(DeviceInfo::Usb));
                }
            }
            #[cfg(not(feature = "transport_hid"))]
            DeviceType::Usb => (),
            DeviceType::Emulator => devices.push(DeviceInfo::Emulator(self.emulator_addr)),
        }

        debug!("Found {} devices: {:?}", devices.len(), devices);

        devices
    }
}

/// Generic connect implementation
#[async_trait]
impl Connect for SkywalletProvider {
    type Channel = GenericTransport;

    async fn connect(&self) -> Result<GenericTransport, Error> {
        let t = match self.device_type {
            #[cfg(feature = "transport_hid")]
            DeviceType::Usb => match &self.hid_api {
                Some(api) => GenericTransport::Usb(UsbChannel::connect(api).await?),
                None => return Err(Error::HidInit),
            },
            #[cfg(not(feature = "transport_hid"))]
            DeviceType::Usb => return Err(Error::NoDevice(DeviceType::Usb)),
            DeviceType::Emulator => {
                GenericTransport::Emulator(EmulatorChannel::connect(self.emulator_addr).await?)
            }
        };

        Ok(t)
    }

    async fn available(&self) -> bool {
        !self.list_devices().is_empty()
    }

    fn device_type(&self) -> DeviceType {
        self.device_type
    }
}

/// Generic device handle (abstract over transport types)
pub type GenericHandle = DeviceHandle<SkywalletProvider>;

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "transport_hid")]
            DeviceInfo::Usb(hid_info) => {
                write!(
                    f,
                    "{:16} (USB, {:04x}:{:04x}, {})",
                    hid_info.product_string().unwrap_or("UNKNOWN"),
                    hid_info.vendor_id(),
                    hid_info.product_id(),
                    hid_info.serial_number().unwrap_or("UNKNOWN"),
                )
            }
            DeviceInfo::Emulator(addr) => {
                write!(f, "{:16} (UDP, {})", "Emulator", addr)
            }
        }
    }
}
