// Copyright (c) 2022-2023 The Skycoin Project

//! Skywallet hardware wallet core
//!
//! This provides an I/O-free [Operation][engine::Operation] engine modelling
//! each device action as a small state machine:
//!
//! ```text
//! Started ──► AwaitingPrompt(kind) ◄──► Resumed ──► Terminal(Success | Failure | Payload)
//! ```
//!
//! Interactions with the engine are performed via [Event][engine::Event]s and
//! [Output][engine::Output]s, the caller is responsible for moving messages
//! between the engine and the device, see [skywallet_proto] for message kinds
//! and wire encodings.
//!
//! ## Prompts
//!
//! - `ButtonRequest` is acknowledged by the engine itself (looping until the
//!   device leaves the prompt) unless the operation is configured to surface
//!   button prompts to the caller
//! - `EntropyRequest` is answered with 32 bytes of host entropy, after which the
//!   _original_ request is resent
//! - `PinMatrixRequest`, `PassphraseRequest` and `WordRequest` are returned to
//!   the caller as [Output::Prompt][engine::Output::Prompt] and resumed with an
//!   [Answer][engine::Answer]
//!
//! Once an operation reaches a terminal outcome any further event is rejected.

pub use skywallet_proto::{self as proto};

pub mod engine;
