// Copyright (c) 2022-2023 The Skycoin Project

//! Fixed-size transport frames and message (re)assembly
//!
//! Messages are prefixed with a 9 byte header and the resulting stream is
//! split over 64-byte frames, each starting with a marker byte:
//!
//! ```text
//!  0       1       2       3       4       5       6       7       8       9      10
//!  +-------+-------+-------+-------+-------+-------+-------+-------+-------+-------+------
//!  | '?'   | '#'   | '#'   | KIND (u16 BE) |        LENGTH (u32 BE)        | '\n'  | PAYLOAD ...
//!  +-------+-------+-------+-------+-------+-------+-------+-------+-------+-------+------
//!
//!  0       1                                                                        64
//!  +-------+------------------------------------------------------------------------+
//!  | '?'   | PAYLOAD (continued, zero padded)                                       |
//!  +-------+------------------------------------------------------------------------+
//! ```

use byteorder::{BigEndian, ByteOrder};
use log::trace;

use crate::{Message, MessageKind};

/// Transport frame size
pub const FRAME_SIZE: usize = 64;

/// Stream bytes carried by each frame (after the marker)
pub const FRAME_DATA: usize = FRAME_SIZE - 1;

/// Marker byte starting every frame
pub const FRAME_MARKER: u8 = b'?';

/// Magic starting every message
pub const MAGIC: [u8; 2] = *b"##";

/// Separator between header and payload
pub const SEPARATOR: u8 = b'\n';

/// Message header length (magic, kind, length, separator)
pub const HEADER_LEN: usize = 9;

/// Maximum supported payload length (leaves room for firmware images)
pub const MAX_PAYLOAD: usize = 2 * 1024 * 1024;

/// A single transport frame
pub type Frame = [u8; FRAME_SIZE];

/// Framing / message decoding errors
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Frame did not start with the marker byte
    #[error("invalid frame marker (0x{0:02x})")]
    Marker(u8),

    /// Empty frame received
    #[error("empty frame")]
    Empty,

    /// Message did not start with the expected magic
    #[error("invalid message magic")]
    Magic,

    /// Payload length exceeds [MAX_PAYLOAD]
    #[error("payload length {0} exceeds maximum")]
    Length(usize),

    /// Kind not in the [MessageKind] enumeration
    #[error("unknown message kind {0}")]
    UnknownKind(u16),

    /// Stream ended before the declared length was received
    #[error("truncated message ({received} of {expected} bytes)")]
    Truncated { received: usize, expected: usize },

    /// Message kind does not match the requested payload schema
    #[error("unexpected message kind {actual} (expected {expected})")]
    UnexpectedKind {
        expected: MessageKind,
        actual: MessageKind,
    },

    /// Protobuf payload decoding failed
    #[error("payload decode failed: {0}")]
    Payload(prost::DecodeError),
}

/// Encode a message to an ordered sequence of frames
///
/// An empty payload still yields exactly one frame.
pub fn encode(kind: MessageKind, payload: &[u8]) -> Result<Vec<Frame>, FrameError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::Length(payload.len()));
    }

    let mut header = [0u8; HEADER_LEN];
    header[..2].copy_from_slice(&MAGIC);
    BigEndian::write_u16(&mut header[2..4], kind as u16);
    BigEndian::write_u32(&mut header[4..8], payload.len() as u32);
    header[8] = SEPARATOR;

    let mut stream = Vec::with_capacity(HEADER_LEN + payload.len());
    stream.extend_from_slice(&header);
    stream.extend_from_slice(payload);

    let frames: Vec<_> = stream
        .chunks(FRAME_DATA)
        .map(|c| {
            let mut f = [0u8; FRAME_SIZE];
            f[0] = FRAME_MARKER;
            f[1..][..c.len()].copy_from_slice(c);
            f
        })
        .collect();

    trace!(
        "Encoded {} ({} bytes) to {} frames",
        kind,
        payload.len(),
        frames.len()
    );

    Ok(frames)
}

/// Decode a single message from a sequence of frames
pub fn decode<'a>(frames: impl IntoIterator<Item = &'a [u8]>) -> Result<Message, FrameError> {
    let mut d = Decoder::new();

    for f in frames {
        if let Some(m) = d.push(f)? {
            return Ok(m);
        }
    }

    Err(d.truncated())
}

/// Parsed message header
#[derive(Copy, Clone, PartialEq, Debug)]
struct Header {
    kind: MessageKind,
    length: usize,
}

/// Incremental message decoder, fed one frame at a time in read order
#[derive(Debug, Default)]
pub struct Decoder {
    header: Option<Header>,
    buff: Vec<u8>,
}

impl Decoder {
    /// Create a new (empty) decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a received frame, returning the message once complete
    ///
    /// Frames may be shorter than [FRAME_SIZE], zero padding following the
    /// declared length is discarded.
    pub fn push(&mut self, frame: &[u8]) -> Result<Option<Message>, FrameError> {
        let (marker, data) = match frame.split_first() {
            Some(v) => v,
            None => return Err(FrameError::Empty),
        };

        if *marker != FRAME_MARKER {
            return Err(FrameError::Marker(*marker));
        }

        self.buff.extend_from_slice(data);

        // Parse header once available
        if self.header.is_none() {
            if self.buff.len() >= MAGIC.len() && self.buff[..2] != MAGIC {
                return Err(FrameError::Magic);
            }
            if self.buff.len() < HEADER_LEN {
                return Ok(None);
            }

            let raw_kind = BigEndian::read_u16(&self.buff[2..4]);
            let kind = MessageKind::try_from(raw_kind)
                .map_err(|_| FrameError::UnknownKind(raw_kind))?;

            let length = BigEndian::read_u32(&self.buff[4..8]) as usize;
            if length > MAX_PAYLOAD {
                return Err(FrameError::Length(length));
            }

            self.header = Some(Header { kind, length });
        }

        // Check whether we have the full payload
        let h = match self.header {
            Some(h) if self.buff.len() >= HEADER_LEN + h.length => h,
            _ => return Ok(None),
        };

        let payload = self.buff[HEADER_LEN..][..h.length].to_vec();

        self.header = None;
        self.buff.clear();

        Ok(Some(Message::new(h.kind, payload)))
    }

    /// Check whether no part of a message has been received
    pub fn is_empty(&self) -> bool {
        self.buff.is_empty()
    }

    /// Number of payload bytes received for the current message
    pub fn received(&self) -> usize {
        self.buff.len().saturating_sub(HEADER_LEN)
    }

    /// Build a [FrameError::Truncated] for a stream that ended early
    pub fn truncated(&self) -> FrameError {
        FrameError::Truncated {
            received: self.received(),
            expected: self.header.map(|h| h.length).unwrap_or(0),
        }
    }
}
