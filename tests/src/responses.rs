// Copyright (c) 2022-2023 The Skycoin Project

//! Device response builders for scripting mock devices

use skywallet_proto::{messages, Message, MessageKind};

/// `Success` with message
pub fn success(msg: &str) -> Message {
    Message::from_payload(&messages::Success {
        message: Some(msg.to_string()),
    })
}

/// `Failure` with code and message
pub fn failure(code: i32, msg: &str) -> Message {
    Message::from_payload(&messages::Failure {
        code: Some(code),
        message: Some(msg.to_string()),
    })
}

pub fn button_request() -> Message {
    Message::from_payload(&messages::ButtonRequest::default())
}

pub fn pin_matrix_request() -> Message {
    Message::from_payload(&messages::PinMatrixRequest::default())
}

pub fn passphrase_request() -> Message {
    Message::from_payload(&messages::PassphraseRequest::default())
}

pub fn word_request() -> Message {
    Message::from_payload(&messages::WordRequest::default())
}

pub fn entropy_request() -> Message {
    Message::from_payload(&messages::EntropyRequest::default())
}

/// `Features` as reported by an initialised device
pub fn features(label: &str) -> Message {
    Message::from_payload(&messages::Features {
        vendor: Some("Skycoin Foundation".to_string()),
        major_version: Some(1),
        minor_version: Some(8),
        patch_version: Some(0),
        label: Some(label.to_string()),
        initialized: Some(true),
        ..Default::default()
    })
}

/// `ResponseSkycoinAddress` with the provided addresses
pub fn addresses(addresses: &[&str]) -> Message {
    Message::from_payload(&messages::ResponseSkycoinAddress {
        addresses: addresses.iter().map(|a| a.to_string()).collect(),
    })
}

/// `ResponseSkycoinSignMessage` with the provided signature
pub fn signature(signature: &str) -> Message {
    Message::from_payload(&messages::ResponseSkycoinSignMessage {
        signed_message: signature.to_string(),
    })
}

/// `ResponseTransactionSign` with the provided signatures
pub fn signatures(signatures: &[&str]) -> Message {
    Message::from_payload(&messages::ResponseTransactionSign {
        signatures: signatures.iter().map(|s| s.to_string()).collect(),
    })
}

/// Raw message with an empty payload
pub fn empty(kind: MessageKind) -> Message {
    Message::new(kind, vec![])
}
