// Copyright (c) 2022-2023 The Skycoin Project

use skywallet_proto::{FrameError, MessageKind};

use super::{Prompt, State};

/// [Operation][super::Operation] errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operation already reached a terminal outcome
    #[error("operation already complete")]
    Terminated,

    /// Event not valid in the current state
    #[error("unexpected event in state {0}")]
    UnexpectedEvent(State),

    /// Answer does not match the pending prompt
    #[error("expected answer to {expected}, got {actual}")]
    UnexpectedAnswer { expected: Prompt, actual: Prompt },

    /// Device responded with a message not valid for this operation
    #[error("received unexpected response message type: {0}")]
    UnexpectedMessage(MessageKind),

    /// Response payload could not be decoded
    #[error(transparent)]
    Frame(#[from] FrameError),
}
