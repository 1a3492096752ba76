// Copyright (c) 2022-2023 The Skycoin Project

//! Operation constructors

use sha2::{Digest, Sha256};

use skywallet_proto::{messages, Message};

use super::{Operation, OperationKind};

/// Transaction input, an unspent output hash and the index of the key owning it
#[derive(Clone, PartialEq, Debug)]
pub struct TxInput {
    pub hash: String,
    pub index: u32,
}

/// Transaction output
#[derive(Clone, PartialEq, Debug)]
pub struct TxOutput {
    pub address: String,
    /// Coins in droplets (1e-6 coin)
    pub coins: u64,
    pub hours: u64,
    /// Key index for change outputs returning to this wallet
    pub address_index: Option<u32>,
}

impl Operation {
    /// Generate `address_n` addresses starting at `start_index`
    pub fn address_gen(address_n: u32, start_index: u32, confirm_address: bool) -> Self {
        let req = messages::SkycoinAddress {
            address_n,
            start_index: Some(start_index),
            confirm_address: Some(confirm_address),
        };

        Self::new(OperationKind::AddressGen, [Message::from_payload(&req)])
    }

    /// Apply device settings, `None` values are left unchanged
    pub fn apply_settings(
        label: Option<String>,
        use_passphrase: Option<bool>,
        language: Option<String>,
    ) -> Self {
        let req = messages::ApplySettings {
            language,
            label,
            use_passphrase,
        };

        Self::new(OperationKind::ApplySettings, [Message::from_payload(&req)])
    }

    /// Display the device seed for backup
    pub fn backup() -> Self {
        let req = messages::BackupDevice {};
        Self::new(OperationKind::Backup, [Message::from_payload(&req)]).with_initialize()
    }

    /// Abort any pending device operation
    pub fn cancel() -> Self {
        let req = messages::Cancel {};
        Self::new(OperationKind::Cancel, [Message::from_payload(&req)])
    }

    /// Configure (or remove) the device PIN
    pub fn change_pin(remove: bool) -> Self {
        let req = messages::ChangePin {
            remove: Some(remove),
        };

        Self::new(OperationKind::ChangePin, [Message::from_payload(&req)])
    }

    /// Check a message signature against an address
    pub fn check_message_signature(address: String, message: String, signature: String) -> Self {
        let req = messages::SkycoinCheckMessageSignature {
            address,
            message,
            signature,
        };

        Self::new(
            OperationKind::CheckMessageSignature,
            [Message::from_payload(&req)],
        )
    }

    /// Ping the device to check it is responding
    pub fn connected() -> Self {
        let mut op = Self::ping("ping".to_string(), false);
        op.kind = OperationKind::Connected;
        op
    }

    /// Ping the device, the device echoes `message` in its `Success` response
    pub fn ping(message: String, button_protection: bool) -> Self {
        let req = messages::Ping {
            message: Some(message),
            button_protection: Some(button_protection),
        };

        Self::new(OperationKind::Ping, [Message::from_payload(&req)])
    }

    /// Fetch device features
    pub fn features() -> Self {
        let req = messages::GetFeatures {};
        Self::new(OperationKind::Features, [Message::from_payload(&req)])
    }

    /// Erase and upload firmware, then acknowledge the device's confirmation
    /// prompt without waiting (the device reboots)
    pub fn firmware_update(payload: Vec<u8>) -> Self {
        let erase = messages::FirmwareErase {
            length: Some(payload.len() as u32),
        };
        let hash = Sha256::digest(&payload).to_vec();
        let upload = messages::FirmwareUpload {
            payload,
            hash: Some(hash),
        };

        let mut op = Self::new(
            OperationKind::FirmwareUpdate,
            [Message::from_payload(&erase), Message::from_payload(&upload)],
        )
        .with_initialize();

        op.trailer = Some(Message::from_payload(&messages::ButtonAck {}));
        op
    }

    /// Generate a new mnemonic on the device
    pub fn generate_mnemonic(word_count: u32, use_passphrase: bool) -> Self {
        let req = messages::GenerateMnemonic {
            word_count: Some(word_count),
            passphrase_protection: Some(use_passphrase),
        };

        Self::new(OperationKind::GenerateMnemonic, [Message::from_payload(&req)])
    }

    /// Recover (or with `dry_run` check) a seed via words entered on the host
    pub fn recovery(word_count: u32, use_passphrase: Option<bool>, dry_run: bool) -> Self {
        let req = messages::RecoveryDevice {
            word_count: Some(word_count),
            passphrase_protection: use_passphrase,
            pin_protection: None,
            dry_run: Some(dry_run),
        };

        Self::new(OperationKind::Recovery, [Message::from_payload(&req)])
    }

    /// Configure the device with a mnemonic
    pub fn set_mnemonic(mnemonic: String) -> Self {
        let req = messages::SetMnemonic { mnemonic };
        Self::new(OperationKind::SetMnemonic, [Message::from_payload(&req)])
    }

    /// Sign a message with the key at `address_n`
    pub fn sign_message(address_n: u32, message: String) -> Self {
        let req = messages::SkycoinSignMessage { address_n, message };
        Self::new(OperationKind::SignMessage, [Message::from_payload(&req)])
    }

    /// Sign a transaction
    pub fn transaction_sign(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        let req = messages::TransactionSign {
            nb_in: inputs.len() as u32,
            transaction_in: inputs
                .into_iter()
                .map(|i| messages::SkycoinTransactionInput {
                    hash_in: i.hash,
                    index: Some(i.index),
                })
                .collect(),
            nb_out: outputs.len() as u32,
            transaction_out: outputs
                .into_iter()
                .map(|o| messages::SkycoinTransactionOutput {
                    address: o.address,
                    coin: o.coins,
                    hour: o.hours,
                    address_index: o.address_index,
                })
                .collect(),
        };

        Self::new(OperationKind::TransactionSign, [Message::from_payload(&req)])
    }

    /// Wipe device configuration
    pub fn wipe() -> Self {
        let req = messages::WipeDevice {};
        Self::new(OperationKind::Wipe, [Message::from_payload(&req)]).with_initialize()
    }
}
