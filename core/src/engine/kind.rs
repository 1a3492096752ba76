// Copyright (c) 2022-2023 The Skycoin Project

use strum::{Display, EnumIter, EnumString, EnumVariantNames};

/// Device operations supported by the [Operation][super::Operation] engine
#[derive(
    Copy, Clone, PartialEq, Eq, Debug, EnumString, Display, EnumVariantNames, EnumIter,
)]
pub enum OperationKind {
    AddressGen,
    ApplySettings,
    Backup,
    Cancel,
    ChangePin,
    CheckMessageSignature,
    Connected,
    Features,
    FirmwareUpdate,
    GenerateMnemonic,
    Ping,
    Recovery,
    SetMnemonic,
    SignMessage,
    TransactionSign,
    Wipe,
}

impl OperationKind {
    /// Operations that always acknowledge button requests themselves,
    /// regardless of the configured button policy
    pub fn always_acks_buttons(&self) -> bool {
        matches!(
            self,
            Self::Backup
                | Self::Wipe
                | Self::SetMnemonic
                | Self::Recovery
                | Self::ChangePin
                | Self::GenerateMnemonic
                | Self::FirmwareUpdate
        )
    }
}
