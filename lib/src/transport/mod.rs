// Copyright (c) 2022-2023 The Skycoin Project

//! Frame transports and the generic transport abstraction
//!
//! Transports move fixed-size frames, messages are (de)framed by
//! [write_message] and [read_message] using [skywallet_proto::frame].

use async_trait::async_trait;
use log::trace;
use strum::Display;

use skywallet_proto::{Decoder, Frame, Message};

use crate::Error;

mod emulator;
pub use emulator::EmulatorChannel;

#[cfg(feature = "transport_hid")]
mod hid;
#[cfg(feature = "transport_hid")]
pub use hid::{UsbChannel, PRODUCT_ID, VENDOR_ID};

/// Bidirectional frame channel to a connected device
#[async_trait]
pub trait Channel: Send {
    /// Write a single frame
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), Error>;

    /// Read a single frame, blocking until one is available
    async fn read_frame(&mut self) -> Result<Vec<u8>, Error>;

    /// Close the channel, subsequent reads / writes fail
    async fn close(&mut self);

    /// Whether this channel connects to the emulator (supports simulated button presses)
    fn is_emulator(&self) -> bool {
        false
    }
}

/// Write a message to the channel, frames are written in order
pub async fn write_message<C: Channel + ?Sized>(c: &mut C, m: &Message) -> Result<(), Error> {
    let frames = m.to_frames()?;

    trace!("Writing {} ({} frames)", m.kind, frames.len());

    for f in &frames {
        c.write_frame(f).await?;
    }

    Ok(())
}

/// Read a single message from the channel
pub async fn read_message<C: Channel + ?Sized>(c: &mut C) -> Result<Message, Error> {
    let mut d = Decoder::new();

    loop {
        let f = match c.read_frame().await {
            Ok(f) => f,
            // Channel closed mid-message
            Err(Error::Disconnected) if !d.is_empty() => return Err(d.truncated().into()),
            Err(e) => return Err(e),
        };

        if let Some(m) = d.push(&f)? {
            trace!("Read {} ({} bytes)", m.kind, m.payload.len());
            return Ok(m);
        }
    }
}

/// Generic device channel (abstract over transport types)
#[derive(Display)]
#[non_exhaustive]
pub enum GenericTransport {
    #[cfg(feature = "transport_hid")]
    Usb(UsbChannel),
    Emulator(EmulatorChannel),
}

/// Convert a USB channel into a generic transport
#[cfg(feature = "transport_hid")]
impl From<UsbChannel> for GenericTransport {
    fn from(t: UsbChannel) -> Self {
        Self::Usb(t)
    }
}

/// Convert an emulator channel into a generic transport
impl From<EmulatorChannel> for GenericTransport {
    fn from(t: EmulatorChannel) -> Self {
        Self::Emulator(t)
    }
}

/// Implementation of [Channel] for [GenericTransport], dispatching to the underlying transport
#[async_trait]
impl Channel for GenericTransport {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), Error> {
        match self {
            #[cfg(feature = "transport_hid")]
            Self::Usb(t) => t.write_frame(frame).await,
            Self::Emulator(t) => t.write_frame(frame).await,
        }
    }

    async fn read_frame(&mut self) -> Result<Vec<u8>, Error> {
        match self {
            #[cfg(feature = "transport_hid")]
            Self::Usb(t) => t.read_frame().await,
            Self::Emulator(t) => t.read_frame().await,
        }
    }

    async fn close(&mut self) {
        match self {
            #[cfg(feature = "transport_hid")]
            Self::Usb(t) => t.close().await,
            Self::Emulator(t) => t.close().await,
        }
    }

    fn is_emulator(&self) -> bool {
        matches!(self, Self::Emulator(_))
    }
}
