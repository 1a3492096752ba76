// Copyright (c) 2022-2023 The Skycoin Project

//! Protocol definitions for communication with Skywallet hardware wallets
//!
//! Messages are a `(kind, payload)` pair, where `kind` is a [MessageKind] and
//! `payload` is the protobuf encoding of the schema bound to that kind
//! (see [messages]). On the wire each message is split into fixed-size
//! 64-byte [frames][frame], the first of which carries a short header:
//!
//! ```text
//!  0       1       2       3       4       5       6       7       8       9
//!  +-------+-------+-------+-------+-------+-------+-------+-------+-------+-------+----
//!  | '?'   | '#'   | '#'   |     KIND      |            LENGTH             | '\n'  | ...
//!  +-------+-------+-------+-------+-------+-------+-------+-------+-------+-------+----
//! ```
//!
//! Continuation frames carry the marker byte followed by up to 63 payload bytes.
//! All header fields are big-endian.

pub mod frame;
pub use frame::{encode, Decoder, Frame, FrameError, FRAME_SIZE, MAX_PAYLOAD};

mod kind;
pub use kind::{ButtonType, FailureCode, MessageKind};

pub mod messages;

/// A protocol message, the logical unit reassembled from one or more frames
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Message kind, determines the payload schema
    pub kind: MessageKind,
    /// Encoded payload
    pub payload: Vec<u8>,
}

/// Payload schema bound to a specific [MessageKind]
pub trait Payload: prost::Message + Default {
    /// Kind used when sending this payload
    const KIND: MessageKind;
}

impl Message {
    /// Create a new message from raw parts
    pub fn new(kind: MessageKind, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    /// Build a message from a typed payload
    pub fn from_payload<P: Payload>(p: &P) -> Self {
        Self {
            kind: P::KIND,
            payload: p.encode_to_vec(),
        }
    }

    /// Decode the payload as `P`, failing if the kind does not match
    pub fn decode<P: Payload>(&self) -> Result<P, FrameError> {
        if self.kind != P::KIND {
            return Err(FrameError::UnexpectedKind {
                expected: P::KIND,
                actual: self.kind,
            });
        }

        P::decode(self.payload.as_slice()).map_err(FrameError::Payload)
    }

    /// Encode this message to transport frames
    pub fn to_frames(&self) -> Result<Vec<Frame>, FrameError> {
        encode(self.kind, &self.payload)
    }
}

impl<P: Payload> From<&P> for Message {
    fn from(p: &P) -> Self {
        Self::from_payload(p)
    }
}
