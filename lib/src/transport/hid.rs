// Copyright (c) 2022-2023 The Skycoin Project

//! USB HID transport for physical devices

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use hidapi::{DeviceInfo, HidApi, HidDevice};
use log::{debug, warn};

use skywallet_proto::{Frame, FRAME_SIZE};

use super::Channel;
use crate::{DeviceType, Error};

/// Skywallet USB vendor ID
pub const VENDOR_ID: u16 = 0x313a;

/// Skywallet USB product ID
pub const PRODUCT_ID: u16 = 0x0001;

/// Connection attempts (USB claim can race with OS enumeration)
const CONNECT_ATTEMPTS: usize = 3;

/// Backoff between connection attempts
const CONNECT_BACKOFF: Duration = Duration::from_millis(100);

/// Read poll interval, bounds how long a closed channel takes to unblock a read
const READ_POLL_MS: i32 = 50;

/// USB HID channel
pub struct UsbChannel {
    device: Arc<Mutex<HidDevice>>,
    closed: Arc<AtomicBool>,
}

impl UsbChannel {
    /// List connected Skywallet devices
    pub fn list(api: &Mutex<HidApi>) -> Vec<DeviceInfo> {
        let mut api = match api.lock() {
            Ok(a) => a,
            Err(p) => p.into_inner(),
        };

        if let Err(e) = api.refresh_devices() {
            warn!("HID device refresh failed: {}", e);
        }

        api.device_list()
            .filter(|d| d.vendor_id() == VENDOR_ID && d.product_id() == PRODUCT_ID)
            .cloned()
            .collect()
    }

    /// Connect to the first available device, retrying with a short backoff
    pub async fn connect(api: &Mutex<HidApi>) -> Result<Self, Error> {
        let mut last_err = Error::NoDevice(DeviceType::Usb);

        for i in 0..CONNECT_ATTEMPTS {
            match Self::open(api) {
                Ok(device) => {
                    return Ok(Self {
                        device: Arc::new(Mutex::new(device)),
                        closed: Arc::new(AtomicBool::new(false)),
                    })
                }
                Err(e) => {
                    debug!("USB connect attempt {} failed: {}", i + 1, e);
                    last_err = e;
                }
            }

            tokio::time::sleep(CONNECT_BACKOFF).await;
        }

        Err(last_err)
    }

    fn open(api: &Mutex<HidApi>) -> Result<HidDevice, Error> {
        let info = Self::list(api)
            .into_iter()
            .next()
            .ok_or(Error::NoDevice(DeviceType::Usb))?;

        let api = match api.lock() {
            Ok(a) => a,
            Err(p) => p.into_inner(),
        };

        let device = info.open_device(&api)?;
        device.set_blocking_mode(false)?;

        Ok(device)
    }
}

#[async_trait]
impl Channel for UsbChannel {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Disconnected);
        }

        // Prefix with HID report ID
        let mut buff = [0u8; FRAME_SIZE + 1];
        buff[1..].copy_from_slice(frame);

        let device = self.device.clone();
        tokio::task::spawn_blocking(move || -> Result<(), Error> {
            let d = device.lock().map_err(|_| Error::Disconnected)?;
            d.write(&buff)?;
            Ok(())
        })
        .await?
    }

    async fn read_frame(&mut self) -> Result<Vec<u8>, Error> {
        let (device, closed) = (self.device.clone(), self.closed.clone());

        // Poll with a timeout so a closed channel unblocks the read
        tokio::task::spawn_blocking(move || -> Result<Vec<u8>, Error> {
            let d = device.lock().map_err(|_| Error::Disconnected)?;
            let mut buff = [0u8; FRAME_SIZE];

            loop {
                if closed.load(Ordering::SeqCst) {
                    return Err(Error::Disconnected);
                }

                let n = d.read_timeout(&mut buff, READ_POLL_MS)?;
                if n > 0 {
                    return Ok(buff[..n].to_vec());
                }
            }
        })
        .await?
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Drop for UsbChannel {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
