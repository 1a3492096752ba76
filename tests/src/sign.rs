// Copyright (c) 2022-2023 The Skycoin Project

//! Message signing tests

use anyhow::anyhow;
use log::info;

use skywallet::{engine::Outcome, Connect, DeviceHandle, Reply};

use crate::wallet::expect_success;

/// Sign a message with the key at `address_n` and check the signature on-device
pub async fn test<C: Connect>(
    d: &DeviceHandle<C>,
    address_n: u32,
    message: &str,
) -> anyhow::Result<()> {
    // Fetch the address for the signing key
    let address = match d.address_gen(1, address_n, false).await? {
        Reply::Done(Outcome::Addresses(a)) if a.len() == 1 => a[0].clone(),
        r => return Err(anyhow!("unexpected address response: {:?}", r)),
    };

    info!("Signing with address {}: '{}'", address, message);

    let signature = match d.sign_message(address_n, message.to_string()).await? {
        Reply::Done(Outcome::Signature(s)) => s,
        r => return Err(anyhow!("unexpected signature response: {:?}", r)),
    };

    info!("Signature: {}", signature);

    let r = d
        .check_message_signature(address, message.to_string(), signature)
        .await?;
    let checked = expect_success(r)?;

    info!("Signature check: {}", checked);

    Ok(())
}
