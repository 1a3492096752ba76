// Copyright (c) 2022-2023 The Skycoin Project

use skywallet_proto::{messages::Features, FailureCode, Message};

use super::Prompt;

/// [`Operation`][super::Operation] outputs (in response to events)
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    /// Write a message to the device and await the response
    Send(Message),

    /// Write a message to the device without awaiting a response, completing the operation
    Notify { message: Message, outcome: Outcome },

    /// Device is waiting on the caller, resume with an [Answer][super::Answer]
    Prompt(Prompt),

    /// Operation complete
    Done(Outcome),
}

/// Terminal operation outcomes
#[derive(Clone, PartialEq, Debug)]
pub enum Outcome {
    /// Success with device message
    Success(String),

    /// Device-reported failure
    Failure { code: i32, message: String },

    /// Generated addresses
    Addresses(Vec<String>),

    /// Device features
    Features(Features),

    /// Message signature
    Signature(String),

    /// Transaction input signatures
    Signatures(Vec<String>),
}

impl Outcome {
    /// Fetch the [FailureCode] for failure outcomes (where known)
    pub fn failure_code(&self) -> Option<FailureCode> {
        match self {
            Outcome::Failure { code, .. } => FailureCode::try_from(*code).ok(),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failure { .. })
    }
}
