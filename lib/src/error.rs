// Copyright (c) 2022-2023 The Skycoin Project

use skywallet_core::engine::{OperationKind, Prompt};
use skywallet_proto::FrameError;

use crate::DeviceType;

/// Skywallet API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HID Init Error
    #[error("could not create HidApi instance")]
    HidInit,

    /// HID transport error
    #[cfg(feature = "transport_hid")]
    #[error("HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// No matching device found
    #[error("no {0} device connected")]
    NoDevice(DeviceType),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other transport errors
    #[error("transport error: {0}")]
    Transport(String),

    /// Transport closed, either by the device or a forced disconnect
    #[error("device disconnected")]
    Disconnected,

    /// Another operation holds the device session
    #[error("device busy, another operation is in progress")]
    Busy,

    /// Malformed / truncated wire data
    #[error("framing error: {0}")]
    Frame(#[from] FrameError),

    /// Operation state machine error
    #[error("{0}")]
    Engine(#[from] skywallet_core::engine::Error),

    /// Continuation with no matching prompt pending
    #[error("no {0} pending")]
    NoPendingPrompt(Prompt),

    /// Operation not supported by the selected device type
    #[error("{0} is not supported by {1} devices")]
    Unsupported(OperationKind, DeviceType),
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Transport(format!("transport task failed: {e}"))
    }
}
