// Copyright (c) 2022-2023 The Skycoin Project

//! Wallet setup tests

use anyhow::anyhow;
use log::info;

use skywallet::{engine::Outcome, Connect, DeviceHandle, Reply};

/// Wipe the device, load the provided mnemonic and check the device reports as initialised
///
/// Button prompts must be acknowledged by the session (see [skywallet::SessionConfig]).
pub async fn test<C: Connect>(d: &DeviceHandle<C>, mnemonic: &str) -> anyhow::Result<()> {
    info!("Wiping device");
    expect_success(d.wipe().await?)?;

    info!("Loading mnemonic");
    expect_success(d.set_mnemonic(mnemonic.to_string()).await?)?;

    let features = match d.features().await? {
        Reply::Done(Outcome::Features(f)) => f,
        r => return Err(anyhow!("unexpected features response: {:?}", r)),
    };

    info!("Device features: {:?}", features);

    if features.initialized != Some(true) {
        return Err(anyhow!("device not initialised following set_mnemonic"));
    }

    Ok(())
}

/// Check a reply is a successful terminal outcome
pub fn expect_success(r: Reply) -> anyhow::Result<String> {
    match r {
        Reply::Done(Outcome::Success(m)) => Ok(m),
        r => Err(anyhow!("expected success, got: {:?}", r)),
    }
}
