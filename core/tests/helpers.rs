// Copyright (c) 2022-2023 The Skycoin Project

#![allow(unused)]

use skywallet_core::proto::{messages, Message, MessageKind};

/// Build a `Success` response
pub fn success(msg: &str) -> Message {
    Message::from_payload(&messages::Success {
        message: Some(msg.to_string()),
    })
}

/// Build a `Failure` response
pub fn failure(code: i32, msg: &str) -> Message {
    Message::from_payload(&messages::Failure {
        code: Some(code),
        message: Some(msg.to_string()),
    })
}

/// Build an empty prompt response of the provided kind
pub fn prompt(kind: MessageKind) -> Message {
    Message::new(kind, vec![])
}
