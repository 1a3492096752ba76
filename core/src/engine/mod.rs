// Copyright (c) 2022-2023 The Skycoin Project

//! The [Operation] engine drives a single device action to a terminal outcome.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [proto][crate::proto] for message kinds and wire encodings.

use std::collections::VecDeque;

use log::{debug, trace};
use rand_core::{OsRng, RngCore};
use strum::Display;

use skywallet_proto::{messages, Message, MessageKind};

mod error;
pub use error::Error;

mod event;
pub use event::Event;

mod kind;
pub use kind::OperationKind;

mod ops;
pub use ops::{TxInput, TxOutput};

mod output;
pub use output::{Outcome, Output};

mod prompt;
pub use prompt::{Answer, Prompt};

/// Host entropy supplied in response to an `EntropyRequest`
pub const ENTROPY_SIZE: usize = 32;

/// Operation internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, Display)]
pub enum State {
    /// Created, no request issued
    Init,
    /// Request written, awaiting the device response
    Started,
    /// Device is waiting on a prompt
    AwaitingPrompt(Prompt),
    /// Prompt answered, awaiting the device response
    Resumed(Prompt),
    /// Operation complete
    Terminal,
}

/// Request issued as part of an operation
#[derive(Clone, PartialEq, Debug)]
struct Step {
    request: Message,
    /// Preamble steps only abort on failure, other responses are discarded
    preamble: bool,
}

/// A single device operation, see [OperationKind] for the supported set
///
/// Constructors for each operation live in `ops.rs`.
#[derive(Clone, Debug)]
pub struct Operation {
    kind: OperationKind,
    state: State,

    /// Requests yet to be issued
    steps: VecDeque<Step>,
    /// Request currently in flight, resent following entropy exchange
    current: Option<Step>,
    /// Message written once the final step succeeds
    trailer: Option<Message>,

    /// Acknowledge button prompts without surfacing them
    auto_ack: bool,
}

impl Operation {
    /// Create a new operation issuing the provided requests in order
    fn new(kind: OperationKind, requests: impl IntoIterator<Item = Message>) -> Self {
        Self {
            kind,
            state: State::Init,
            steps: requests
                .into_iter()
                .map(|request| Step {
                    request,
                    preamble: false,
                })
                .collect(),
            current: None,
            trailer: None,
            auto_ack: true,
        }
    }

    /// Prefix the operation with an `Initialize` whose response is discarded
    fn with_initialize(mut self) -> Self {
        self.steps.push_front(Step {
            request: Message::from_payload(&messages::Initialize {}),
            preamble: true,
        });
        self
    }

    /// Re-enter an operation left waiting on `prompt` by a previous session
    pub fn continuation(kind: OperationKind, prompt: Prompt) -> Self {
        Self {
            kind,
            state: State::AwaitingPrompt(prompt),
            steps: VecDeque::new(),
            current: None,
            trailer: None,
            auto_ack: true,
        }
    }

    /// Configure button prompt handling
    ///
    /// When disabled `ButtonRequest`s are surfaced to the caller, except for
    /// operations that always acknowledge buttons
    /// (see [OperationKind::always_acks_buttons]).
    pub fn with_auto_ack(mut self, auto_ack: bool) -> Self {
        self.auto_ack = auto_ack || self.kind.always_acks_buttons();
        self
    }

    /// Fetch operation kind
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Fetch operation state
    pub fn state(&self) -> State {
        self.state
    }

    /// Check whether the operation is complete
    pub fn is_terminal(&self) -> bool {
        self.state == State::Terminal
    }

    /// Update the operation with an incoming event, returning the next action
    pub fn update(&mut self, evt: Event) -> Result<Output, Error> {
        trace!("{} update in state {}: {:?}", self.kind, self.state, evt);

        match (self.state, evt) {
            (State::Terminal, _) => Err(Error::Terminated),

            (State::Init, Event::Start) => self.next_step(),

            (State::Started | State::Resumed(_), Event::Response(m)) => self.response(m),

            (State::AwaitingPrompt(p), Event::Resume(a)) => {
                if a.prompt() != p {
                    return Err(Error::UnexpectedAnswer {
                        expected: p,
                        actual: a.prompt(),
                    });
                }

                self.state = State::Resumed(p);
                Ok(Output::Send(a.to_message()))
            }

            (s, _) => Err(Error::UnexpectedEvent(s)),
        }
    }

    /// Issue the next request, or complete when none remain
    fn next_step(&mut self) -> Result<Output, Error> {
        match self.steps.pop_front() {
            Some(s) => {
                let m = s.request.clone();
                self.current = Some(s);
                self.state = State::Started;
                Ok(Output::Send(m))
            }
            None => {
                self.state = State::Terminal;
                Err(Error::UnexpectedEvent(State::Init))
            }
        }
    }

    /// Handle a device response
    fn response(&mut self, m: Message) -> Result<Output, Error> {
        debug!("{} received {}", self.kind, m.kind);

        // Failures are always terminal
        if m.kind == MessageKind::Failure {
            return self.complete(&m);
        }

        // Discard non-failure preamble responses
        if self.state == State::Started && self.current.as_ref().map(|s| s.preamble) == Some(true)
        {
            return self.next_step();
        }

        // Following an entropy exchange the original request is resent
        if self.state == State::Resumed(Prompt::EntropyRequest) {
            return match &self.current {
                Some(s) => {
                    self.state = State::Started;
                    Ok(Output::Send(s.request.clone()))
                }
                None => self.unexpected(m.kind),
            };
        }

        let p = match Prompt::from_kind(m.kind) {
            Some(p) => p,
            None => return self.complete(&m),
        };

        self.state = State::AwaitingPrompt(p);

        match p {
            Prompt::ButtonRequest if self.auto_ack => {
                debug!("{} acknowledging button request", self.kind);
                self.state = State::Resumed(p);
                Ok(Output::Send(Answer::Button.to_message()))
            }
            Prompt::EntropyRequest => {
                let mut entropy = vec![0u8; ENTROPY_SIZE];
                OsRng.fill_bytes(&mut entropy);

                self.state = State::Resumed(p);
                Ok(Output::Send(Message::from_payload(&messages::EntropyAck {
                    entropy: Some(entropy),
                })))
            }
            _ => Ok(Output::Prompt(p)),
        }
    }

    /// Handle a terminal (non-prompt) response
    fn complete(&mut self, m: &Message) -> Result<Output, Error> {
        let outcome = match m.kind {
            MessageKind::Success => {
                let s = m.decode::<messages::Success>()?;

                // Intermediate steps continue on success
                if !self.steps.is_empty() {
                    return self.next_step();
                }

                Outcome::Success(s.message.unwrap_or_default())
            }
            MessageKind::Failure => {
                let f = m.decode::<messages::Failure>()?;
                Outcome::Failure {
                    code: f.code.unwrap_or_default(),
                    message: f.message.unwrap_or_default(),
                }
            }
            MessageKind::ResponseSkycoinAddress => {
                let r = m.decode::<messages::ResponseSkycoinAddress>()?;
                Outcome::Addresses(r.addresses)
            }
            MessageKind::Features => Outcome::Features(m.decode::<messages::Features>()?),
            MessageKind::ResponseSkycoinSignMessage => {
                let r = m.decode::<messages::ResponseSkycoinSignMessage>()?;
                Outcome::Signature(r.signed_message)
            }
            MessageKind::ResponseTransactionSign => {
                let r = m.decode::<messages::ResponseTransactionSign>()?;
                Outcome::Signatures(r.signatures)
            }
            k => return self.unexpected(k),
        };

        self.state = State::Terminal;

        match (self.trailer.take(), outcome.is_success()) {
            (Some(message), true) => Ok(Output::Notify { message, outcome }),
            _ => Ok(Output::Done(outcome)),
        }
    }

    fn unexpected(&mut self, kind: MessageKind) -> Result<Output, Error> {
        self.state = State::Terminal;
        Err(Error::UnexpectedMessage(kind))
    }
}
