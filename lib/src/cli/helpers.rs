// Copyright (c) 2022-2023 The Skycoin Project

use std::io::Write;

use anyhow::anyhow;
use log::info;
use zeroize::Zeroizing;

use skywallet::{
    engine::{Outcome, Prompt},
    Connect, DeviceHandle, Reply,
};

/// Fixed length hex encoded data
#[derive(Clone, PartialEq, Debug)]
pub struct HexData<const N: usize = 32>(pub [u8; N]);

impl<const N: usize> std::str::FromStr for HexData<N> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut b = [0u8; N];

        hex::decode_to_slice(s, &mut b)?;

        Ok(HexData(b))
    }
}

impl<const N: usize> std::fmt::Display for HexData<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Answer device prompts from stdin until the operation completes
pub async fn complete<C: Connect>(h: &DeviceHandle<C>, mut r: Reply) -> anyhow::Result<Outcome> {
    loop {
        let p = match r {
            Reply::Done(o) => return Ok(o),
            Reply::Prompt(p) => p,
        };

        r = match p {
            Prompt::PinMatrixRequest => {
                let pin = read_line(
                    "Enter PIN positions from the device matrix (7 8 9 / 4 5 6 / 1 2 3)",
                )?;
                h.pin_matrix_ack(pin.to_string()).await?
            }
            Prompt::PassphraseRequest => {
                let passphrase = read_line("Enter passphrase")?;
                h.passphrase_ack(passphrase.to_string()).await?
            }
            Prompt::WordRequest => {
                let word = read_line("Enter the word requested on the device")?;
                h.word_ack(word.to_string()).await?
            }
            Prompt::ButtonRequest => {
                info!("Confirm on the device");
                h.button_ack().await?
            }
            Prompt::EntropyRequest => return Err(anyhow!("unexpected entropy prompt")),
        };
    }
}

/// Display an operation outcome, failures are returned as errors
pub fn show(o: Outcome) -> anyhow::Result<()> {
    match o {
        Outcome::Success(m) => info!("Success: {}", m),
        Outcome::Failure { code, message } => {
            return Err(anyhow!("device failure ({}): {}", code, message))
        }
        Outcome::Addresses(a) => {
            for (i, a) in a.iter().enumerate() {
                info!("  {}: {}", i, a);
            }
        }
        Outcome::Features(f) => info!("Features: {}", serde_json::to_string_pretty(&f)?),
        Outcome::Signature(s) => info!("Signature: {}", s),
        Outcome::Signatures(s) => {
            for (i, s) in s.iter().enumerate() {
                info!("  {}: {}", i, s);
            }
        }
    }

    Ok(())
}

/// Prompt for and read a line of input from stdin
fn read_line(prompt: &str) -> anyhow::Result<Zeroizing<String>> {
    print!("{prompt}: ");
    std::io::stdout().flush()?;

    let mut line = Zeroizing::new(String::new());
    std::io::stdin().read_line(&mut line)?;

    Ok(Zeroizing::new(line.trim().to_string()))
}
