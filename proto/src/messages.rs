// Copyright (c) 2022-2023 The Skycoin Project

//! Protobuf payload schemas, one per [MessageKind]
//!
//! These mirror the device's `messages.proto` (proto2) definitions and are
//! bound to their kinds via [Payload], see [Message::from_payload][crate::Message::from_payload]
//! and [Message::decode][crate::Message::decode].

use crate::{MessageKind, Payload};

/// Reset device state and fetch [Features]
#[derive(Clone, PartialEq, prost::Message)]
pub struct Initialize {}

/// Fetch [Features] without resetting state
#[derive(Clone, PartialEq, prost::Message)]
pub struct GetFeatures {}

/// Device features / configuration
#[derive(Clone, PartialEq, prost::Message)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Features {
    #[prost(string, optional, tag = "1")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub vendor: Option<String>,
    #[prost(uint32, optional, tag = "2")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub major_version: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub minor_version: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub patch_version: Option<u32>,
    #[prost(bool, optional, tag = "5")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub bootloader_mode: Option<bool>,
    #[prost(string, optional, tag = "6")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub device_id: Option<String>,
    #[prost(bool, optional, tag = "7")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub pin_protection: Option<bool>,
    #[prost(bool, optional, tag = "8")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub passphrase_protection: Option<bool>,
    #[prost(string, optional, tag = "9")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub language: Option<String>,
    #[prost(string, optional, tag = "10")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "12")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub initialized: Option<bool>,
    #[prost(bool, optional, tag = "16")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub pin_cached: Option<bool>,
    #[prost(bool, optional, tag = "17")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub passphrase_cached: Option<bool>,
    #[prost(bool, optional, tag = "18")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub firmware_present: Option<bool>,
    #[prost(bool, optional, tag = "19")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub needs_backup: Option<bool>,
    #[prost(string, optional, tag = "21")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub model: Option<String>,
    #[prost(uint32, optional, tag = "22")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fw_major: Option<u32>,
    #[prost(uint32, optional, tag = "23")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fw_minor: Option<u32>,
    #[prost(uint32, optional, tag = "24")]
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub fw_patch: Option<u32>,
}

/// Connectivity check, answered with [Success]
#[derive(Clone, PartialEq, prost::Message)]
pub struct Ping {
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
    #[prost(bool, optional, tag = "2")]
    pub button_protection: Option<bool>,
}

/// Terminal success response
#[derive(Clone, PartialEq, prost::Message)]
pub struct Success {
    #[prost(string, optional, tag = "1")]
    pub message: Option<String>,
}

/// Terminal failure response
#[derive(Clone, PartialEq, prost::Message)]
pub struct Failure {
    /// See [FailureCode][crate::FailureCode]
    #[prost(int32, optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub message: Option<String>,
}

/// Device is waiting for a physical button press
#[derive(Clone, PartialEq, prost::Message)]
pub struct ButtonRequest {
    #[prost(int32, optional, tag = "1")]
    pub code: Option<i32>,
    #[prost(string, optional, tag = "2")]
    pub data: Option<String>,
}

/// Host acknowledges a [ButtonRequest]
#[derive(Clone, PartialEq, prost::Message)]
pub struct ButtonAck {}

/// Device is waiting for a PIN entered via the scrambled matrix
#[derive(Clone, PartialEq, prost::Message)]
pub struct PinMatrixRequest {
    #[prost(int32, optional, tag = "1")]
    pub kind: Option<i32>,
}

/// PIN encoded as matrix positions
#[derive(Clone, PartialEq, prost::Message)]
pub struct PinMatrixAck {
    #[prost(string, required, tag = "1")]
    pub pin: String,
}

/// Abort the current device operation
#[derive(Clone, PartialEq, prost::Message)]
pub struct Cancel {}

/// Device is waiting for a passphrase
#[derive(Clone, PartialEq, prost::Message)]
pub struct PassphraseRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct PassphraseAck {
    #[prost(string, required, tag = "1")]
    pub passphrase: String,
}

/// Device is requesting host entropy
#[derive(Clone, PartialEq, prost::Message)]
pub struct EntropyRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct EntropyAck {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub entropy: Option<Vec<u8>>,
}

/// Device is waiting for the next recovery word
#[derive(Clone, PartialEq, prost::Message)]
pub struct WordRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WordAck {
    #[prost(string, required, tag = "1")]
    pub word: String,
}

/// Change device settings
#[derive(Clone, PartialEq, prost::Message)]
pub struct ApplySettings {
    #[prost(string, optional, tag = "1")]
    pub language: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub label: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub use_passphrase: Option<bool>,
}

/// Set, change or remove the device PIN
#[derive(Clone, PartialEq, prost::Message)]
pub struct ChangePin {
    #[prost(bool, optional, tag = "1")]
    pub remove: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct WipeDevice {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BackupDevice {}

/// Erase firmware ahead of an upload
#[derive(Clone, PartialEq, prost::Message)]
pub struct FirmwareErase {
    #[prost(uint32, optional, tag = "1")]
    pub length: Option<u32>,
}

/// Upload a firmware image
#[derive(Clone, PartialEq, prost::Message)]
pub struct FirmwareUpload {
    #[prost(bytes = "vec", required, tag = "1")]
    pub payload: Vec<u8>,
    /// SHA-256 of `payload`
    #[prost(bytes = "vec", optional, tag = "2")]
    pub hash: Option<Vec<u8>>,
}

/// Recover a seed by entering words on the host
#[derive(Clone, PartialEq, prost::Message)]
pub struct RecoveryDevice {
    #[prost(uint32, optional, tag = "1")]
    pub word_count: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub passphrase_protection: Option<bool>,
    #[prost(bool, optional, tag = "3")]
    pub pin_protection: Option<bool>,
    #[prost(bool, optional, tag = "7")]
    pub dry_run: Option<bool>,
}

/// Generate a new mnemonic on the device
#[derive(Clone, PartialEq, prost::Message)]
pub struct GenerateMnemonic {
    #[prost(uint32, optional, tag = "1")]
    pub word_count: Option<u32>,
    #[prost(bool, optional, tag = "2")]
    pub passphrase_protection: Option<bool>,
}

/// Configure the device with the provided mnemonic
#[derive(Clone, PartialEq, prost::Message)]
pub struct SetMnemonic {
    #[prost(string, required, tag = "1")]
    pub mnemonic: String,
}

/// Generate `address_n` addresses from `start_index`
#[derive(Clone, PartialEq, prost::Message)]
pub struct SkycoinAddress {
    #[prost(uint32, required, tag = "1")]
    pub address_n: u32,
    #[prost(uint32, optional, tag = "2")]
    pub start_index: Option<u32>,
    #[prost(bool, optional, tag = "3")]
    pub confirm_address: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ResponseSkycoinAddress {
    #[prost(string, repeated, tag = "1")]
    pub addresses: Vec<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SkycoinCheckMessageSignature {
    #[prost(string, required, tag = "1")]
    pub address: String,
    #[prost(string, required, tag = "2")]
    pub message: String,
    #[prost(string, required, tag = "3")]
    pub signature: String,
}

/// Sign a message with the key at `address_n`
#[derive(Clone, PartialEq, prost::Message)]
pub struct SkycoinSignMessage {
    #[prost(uint32, required, tag = "1")]
    pub address_n: u32,
    #[prost(string, required, tag = "2")]
    pub message: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ResponseSkycoinSignMessage {
    #[prost(string, required, tag = "1")]
    pub signed_message: String,
}

/// Transaction input, referenced by unspent output hash
#[derive(Clone, PartialEq, prost::Message)]
pub struct SkycoinTransactionInput {
    #[prost(string, required, tag = "1")]
    pub hash_in: String,
    #[prost(uint32, optional, tag = "2")]
    pub index: Option<u32>,
}

/// Transaction output, `coin` in droplets
#[derive(Clone, PartialEq, prost::Message)]
pub struct SkycoinTransactionOutput {
    #[prost(string, required, tag = "1")]
    pub address: String,
    #[prost(uint64, required, tag = "2")]
    pub coin: u64,
    #[prost(uint64, required, tag = "3")]
    pub hour: u64,
    #[prost(uint32, optional, tag = "4")]
    pub address_index: Option<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TransactionSign {
    #[prost(uint32, required, tag = "1")]
    pub nb_in: u32,
    #[prost(message, repeated, tag = "2")]
    pub transaction_in: Vec<SkycoinTransactionInput>,
    #[prost(uint32, required, tag = "3")]
    pub nb_out: u32,
    #[prost(message, repeated, tag = "4")]
    pub transaction_out: Vec<SkycoinTransactionOutput>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ResponseTransactionSign {
    #[prost(string, repeated, tag = "1")]
    pub signatures: Vec<String>,
}

/// Emulator only, see [ButtonType][crate::ButtonType]
#[derive(Clone, PartialEq, prost::Message)]
pub struct SimulateButtonPress {
    #[prost(int32, optional, tag = "1")]
    pub button_type: Option<i32>,
}

/// Bind payload schemas to the [MessageKind] of the same name
macro_rules! payloads {
    ($($t:ident),* $(,)?) => {
        $(
            impl Payload for $t {
                const KIND: MessageKind = MessageKind::$t;
            }
        )*
    };
}

payloads!(
    Initialize,
    GetFeatures,
    Features,
    Ping,
    Success,
    Failure,
    ButtonRequest,
    ButtonAck,
    PinMatrixRequest,
    PinMatrixAck,
    Cancel,
    PassphraseRequest,
    PassphraseAck,
    EntropyRequest,
    EntropyAck,
    WordRequest,
    WordAck,
    ApplySettings,
    ChangePin,
    WipeDevice,
    BackupDevice,
    FirmwareErase,
    FirmwareUpload,
    RecoveryDevice,
    GenerateMnemonic,
    SetMnemonic,
    SkycoinAddress,
    ResponseSkycoinAddress,
    SkycoinCheckMessageSignature,
    SkycoinSignMessage,
    ResponseSkycoinSignMessage,
    TransactionSign,
    ResponseTransactionSign,
    SimulateButtonPress,
);

#[cfg(test)]
mod test {
    use crate::{FrameError, Message};

    use super::*;

    #[test]
    fn payload_kinds() {
        let m = Message::from_payload(&WordAck {
            word: "abandon".to_string(),
        });
        assert_eq!(m.kind, MessageKind::WordAck);

        let w: WordAck = m.decode().unwrap();
        assert_eq!(w.word, "abandon");
    }

    #[test]
    fn decode_checks_kind() {
        let m = Message::from_payload(&Success {
            message: Some("ok".to_string()),
        });

        assert!(matches!(
            m.decode::<Failure>(),
            Err(FrameError::UnexpectedKind {
                expected: MessageKind::Failure,
                actual: MessageKind::Success
            })
        ));
    }

    #[test]
    fn empty_payloads() {
        assert!(Message::from_payload(&ButtonAck {}).payload.is_empty());
        assert!(Message::from_payload(&Initialize {}).payload.is_empty());
    }
}
