// Copyright (c) 2022-2023 The Skycoin Project

//! Message kind and failure code enumerations

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

/// Skywallet message kinds
///
/// Numbering is shared with the device firmware and must not change.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    EnumString,
    Display,
    EnumVariantNames,
    EnumIter,
    TryFromPrimitive,
)]
#[repr(u16)]
pub enum MessageKind {
    Initialize = 0,
    Ping = 1,
    Success = 2,
    Failure = 3,
    ChangePin = 4,
    WipeDevice = 5,
    FirmwareErase = 6,
    FirmwareUpload = 7,
    Features = 17,
    PinMatrixRequest = 18,
    PinMatrixAck = 19,
    Cancel = 20,
    ApplySettings = 25,
    ButtonRequest = 26,
    ButtonAck = 27,
    BackupDevice = 34,
    EntropyRequest = 35,
    EntropyAck = 36,
    PassphraseRequest = 41,
    PassphraseAck = 42,
    RecoveryDevice = 45,
    WordRequest = 46,
    WordAck = 47,
    GetFeatures = 55,

    // Skycoin specific messages
    SkycoinAddress = 100,
    ResponseSkycoinAddress = 101,
    SkycoinCheckMessageSignature = 102,
    SkycoinSignMessage = 103,
    ResponseSkycoinSignMessage = 104,
    GenerateMnemonic = 105,
    SetMnemonic = 106,
    TransactionSign = 107,
    ResponseTransactionSign = 108,

    /// Emulator only, presses a button on the simulated device
    SimulateButtonPress = 110,
}

impl MessageKind {
    /// Check whether this kind is a device prompt (a non-terminal response)
    pub fn is_prompt(&self) -> bool {
        matches!(
            self,
            Self::ButtonRequest
                | Self::PinMatrixRequest
                | Self::PassphraseRequest
                | Self::WordRequest
                | Self::EntropyRequest
        )
    }
}

impl From<MessageKind> for u16 {
    fn from(k: MessageKind) -> Self {
        k as u16
    }
}

/// Failure codes reported by the device in [Failure][crate::messages::Failure] messages
#[derive(Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, TryFromPrimitive)]
#[repr(i32)]
pub enum FailureCode {
    UnexpectedMessage = 1,
    ButtonExpected = 2,
    DataError = 3,
    ActionCancelled = 4,
    PinExpected = 5,
    PinCancelled = 6,
    PinInvalid = 7,
    InvalidSignature = 8,
    ProcessError = 9,
    NotEnoughFunds = 10,
    NotInitialized = 11,
    PinMismatch = 12,
    AddressGeneration = 13,
    FirmwareError = 99,
}

/// Buttons available on the (emulated) device
#[derive(
    Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, EnumVariantNames, TryFromPrimitive,
)]
#[strum(serialize_all = "lowercase")]
#[repr(i32)]
pub enum ButtonType {
    Left = 0,
    Right = 1,
    Both = 2,
}
