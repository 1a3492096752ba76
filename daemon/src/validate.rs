// Copyright (c) 2022-2023 The Skycoin Project

//! Request bodies and validation
//!
//! Validation runs before any device I/O, failures are 400 (missing fields)
//! or 422 (invalid values).

use log::warn;
use serde::Deserialize;

use skywallet::engine::{TxInput, TxOutput};

use crate::response::ApiError;

/// Maximum firmware image size
pub const FIRMWARE_MAX: usize = 1024 * 1024;

/// Droplets per coin
const DROPLETS_PER_COIN: u64 = 1_000_000;

/// Decimal places supported for coin amounts
const DROPLET_PRECISION: usize = 6;

/// Address generation beyond this index is logged
const HIGH_ADDRESS_INDEX: i64 = 8;

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct GenerateAddressesRequest {
    pub address_n: i64,
    #[serde(default)]
    pub start_index: i64,
    #[serde(default)]
    pub confirm_address: bool,
}

impl GenerateAddressesRequest {
    /// Validate, returning `(address_n, start_index)`
    pub fn validate(&self) -> Result<(u32, u32), ApiError> {
        if self.address_n == 0 {
            return Err(ApiError::unprocessable("address_n cannot be 0"));
        }
        if self.address_n < 0 {
            return Err(ApiError::unprocessable("address_n cannot be negative"));
        }
        if self.start_index < 0 {
            return Err(ApiError::unprocessable("start_index cannot be negative"));
        }

        if self.address_n + self.start_index > HIGH_ADDRESS_INDEX {
            warn!(
                "Generating high index addresses: start_index: {}, address_n: {}",
                self.start_index, self.address_n
            );
        }

        let address_n = u32::try_from(self.address_n)
            .map_err(|_| ApiError::unprocessable("address_n out of range"))?;
        let start_index = u32::try_from(self.start_index)
            .map_err(|_| ApiError::unprocessable("start_index out of range"))?;

        Ok((address_n, start_index))
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct ApplySettingsRequest {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub use_passphrase: Option<bool>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct CheckMessageSignatureRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub address: String,
}

impl CheckMessageSignatureRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        for (name, v) in [
            ("address", &self.address),
            ("signature", &self.signature),
            ("message", &self.message),
        ] {
            if v.is_empty() {
                return Err(ApiError::bad_request(format!("{name} is required")));
            }
        }

        Ok(())
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct ConfigurePinCodeRequest {
    #[serde(default)]
    pub remove_pin: bool,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct GenerateMnemonicRequest {
    pub word_count: u32,
    #[serde(default)]
    pub use_passphrase: bool,
}

impl GenerateMnemonicRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_word_count(self.word_count)
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct RecoveryRequest {
    pub word_count: u32,
    #[serde(default)]
    pub use_passphrase: Option<bool>,
    #[serde(default)]
    pub dry_run: bool,
}

impl RecoveryRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_word_count(self.word_count)
    }
}

fn validate_word_count(word_count: u32) -> Result<(), ApiError> {
    match word_count {
        12 | 24 => Ok(()),
        _ => Err(ApiError::unprocessable("word count must be 12 or 24")),
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct SetMnemonicRequest {
    pub mnemonic: String,
}

impl SetMnemonicRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        bip39::Mnemonic::validate(&self.mnemonic, bip39::Language::English)
            .map_err(|_| ApiError::unprocessable("seed is not a valid bip39 seed"))
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct SignMessageRequest {
    pub address_n: i64,
    #[serde(default)]
    pub message: String,
}

impl SignMessageRequest {
    /// Validate, returning the signing key index
    pub fn validate(&self) -> Result<u32, ApiError> {
        if self.address_n < 0 {
            return Err(ApiError::unprocessable("address_n cannot be negative"));
        }
        if self.message.is_empty() {
            return Err(ApiError::bad_request("message is required"));
        }

        u32::try_from(self.address_n).map_err(|_| ApiError::unprocessable("address_n out of range"))
    }
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct TransactionSignRequest {
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub input_indexes: Vec<u32>,
    #[serde(default)]
    pub output_addresses: Vec<String>,
    #[serde(default)]
    pub coins: Vec<String>,
    #[serde(default)]
    pub hours: Vec<String>,
    #[serde(default)]
    pub address_indexes: Vec<u32>,
}

impl TransactionSignRequest {
    /// Validate and build transaction inputs and outputs
    pub fn validate(self) -> Result<(Vec<TxInput>, Vec<TxOutput>), ApiError> {
        let required = [
            ("inputs", self.inputs.is_empty()),
            ("input_indexes", self.input_indexes.is_empty()),
            ("coins", self.coins.is_empty()),
            ("hours", self.hours.is_empty()),
            ("output_addresses", self.output_addresses.is_empty()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, empty)| *empty) {
            return Err(ApiError::bad_request(format!("{name} is required")));
        }

        if self.inputs.len() != self.input_indexes.len() {
            return Err(ApiError::unprocessable(
                "inputs length not equal to input_indexes length",
            ));
        }
        if self.output_addresses.len() != self.coins.len() {
            return Err(ApiError::unprocessable(
                "output_addresses length not equal to coins length",
            ));
        }
        if self.output_addresses.len() != self.hours.len() {
            return Err(ApiError::unprocessable(
                "output_addresses length not equal to hours length",
            ));
        }

        let inputs = self
            .inputs
            .into_iter()
            .zip(self.input_indexes)
            .map(|(hash, index)| TxInput { hash, index })
            .collect();

        let mut outputs = Vec::with_capacity(self.output_addresses.len());
        for (i, address) in self.output_addresses.into_iter().enumerate() {
            let coins = parse_droplets(&self.coins[i]).map_err(ApiError::unprocessable)?;
            let hours = self.hours[i].parse::<u64>().map_err(|e| {
                ApiError::unprocessable(format!("invalid hours '{}': {e}", self.hours[i]))
            })?;

            outputs.push(TxOutput {
                address,
                coins,
                hours,
                address_index: self.address_indexes.get(i).copied(),
            });
        }

        Ok((inputs, outputs))
    }
}

/// Parse a decimal coin amount to droplets
pub fn parse_droplets(s: &str) -> Result<u64, String> {
    let invalid = || format!("invalid coin amount '{s}'");

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > DROPLET_PRECISION {
        return Err(format!(
            "coin amount '{s}' exceeds {DROPLET_PRECISION} decimal places"
        ));
    }

    let whole = match whole {
        "" => 0,
        w => w.parse::<u64>().map_err(|_| invalid())?,
    };
    let frac = match frac {
        "" => 0,
        f => {
            let pad = DROPLET_PRECISION - f.len();
            f.parse::<u64>().map_err(|_| invalid())? * 10u64.pow(pad as u32)
        }
    };

    whole
        .checked_mul(DROPLETS_PER_COIN)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(invalid)
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct PinMatrixRequest {
    pub pin: String,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct PassphraseRequest {
    pub passphrase: String,
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct WordRequest {
    pub word: String,
}
