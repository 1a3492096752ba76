// Copyright (c) 2022-2023 The Skycoin Project

use strum::{Display, EnumString};

use skywallet_proto::{messages, Message, MessageKind};

/// Device prompts, non-terminal responses awaiting continuation
///
/// Display names match the prompt message kinds reported to clients.
#[derive(Copy, Clone, PartialEq, Eq, Debug, EnumString, Display)]
pub enum Prompt {
    ButtonRequest,
    PinMatrixRequest,
    PassphraseRequest,
    WordRequest,
    /// Answered by the engine, never surfaced
    EntropyRequest,
}

impl Prompt {
    /// Map a message kind to a prompt (if it is one)
    pub fn from_kind(kind: MessageKind) -> Option<Self> {
        let p = match kind {
            MessageKind::ButtonRequest => Self::ButtonRequest,
            MessageKind::PinMatrixRequest => Self::PinMatrixRequest,
            MessageKind::PassphraseRequest => Self::PassphraseRequest,
            MessageKind::WordRequest => Self::WordRequest,
            MessageKind::EntropyRequest => Self::EntropyRequest,
            _ => return None,
        };
        Some(p)
    }
}

/// Caller-supplied answers resuming a [Prompt]
#[derive(Clone, PartialEq, Debug)]
pub enum Answer {
    /// Acknowledge a button prompt
    Button,
    /// PIN encoded as positions in the scrambled matrix shown on the device
    PinMatrix(String),
    Passphrase(String),
    /// Recovery word
    Word(String),
}

impl Answer {
    /// Prompt this answer resumes
    pub fn prompt(&self) -> Prompt {
        match self {
            Answer::Button => Prompt::ButtonRequest,
            Answer::PinMatrix(_) => Prompt::PinMatrixRequest,
            Answer::Passphrase(_) => Prompt::PassphraseRequest,
            Answer::Word(_) => Prompt::WordRequest,
        }
    }

    /// Build the acknowledgement message for this answer
    pub fn to_message(&self) -> Message {
        match self {
            Answer::Button => Message::from_payload(&messages::ButtonAck {}),
            Answer::PinMatrix(pin) => {
                Message::from_payload(&messages::PinMatrixAck { pin: pin.clone() })
            }
            Answer::Passphrase(passphrase) => Message::from_payload(&messages::PassphraseAck {
                passphrase: passphrase.clone(),
            }),
            Answer::Word(word) => Message::from_payload(&messages::WordAck { word: word.clone() }),
        }
    }
}
