// Copyright (c) 2022-2023 The Skycoin Project

use skywallet_proto::Message;

use super::Answer;

/// [`Operation`][super::Operation] input events
#[derive(Clone, Debug)]
pub enum Event {
    /// Start the operation, issuing the first request
    Start,

    /// Response received from the device
    Response(Message),

    /// Caller answer to a pending prompt
    Resume(Answer),
}
