// Copyright (c) 2022-2023 The Skycoin Project

//! HTTP handlers, one per device operation
//!
//! Interactive operations are run via [session::interactive], continuation
//! handlers under `/intermediate` resume the prompt left pending by an
//! earlier request.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
};
use log::{debug, info};
use serde::Serialize;

use skywallet::Connect;

use crate::{
    extract::JsonBody,
    response::{reply, ApiData, ApiError, ApiResult},
    validate::*,
    AppState,
};

mod session;
use session::interactive;

pub async fn generate_addresses<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<GenerateAddressesRequest>,
) -> ApiResult {
    let (address_n, start_index) = req.validate()?;
    let confirm = req.confirm_address;

    interactive(&s, move |h| async move {
        h.address_gen(address_n, start_index, confirm).await
    })
    .await
}

pub async fn apply_settings<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<ApplySettingsRequest>,
) -> ApiResult {
    interactive(&s, move |h| async move {
        h.apply_settings(req.label, req.use_passphrase, req.language)
            .await
    })
    .await
}

pub async fn backup<C: Connect>(State(s): State<AppState<C>>) -> ApiResult {
    interactive(&s, |h| async move { h.backup().await }).await
}

/// Cancel runs outside the request race, it disconnects in-flight operations itself
pub async fn cancel<C: Connect>(State(s): State<AppState<C>>) -> ApiResult {
    info!("Cancelling device operations");
    reply(s.handle.cancel().await?)
}

pub async fn check_message_signature<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<CheckMessageSignatureRequest>,
) -> ApiResult {
    req.validate()?;

    interactive(&s, move |h| async move {
        h.check_message_signature(req.address, req.message, req.signature)
            .await
    })
    .await
}

pub async fn configure_pin_code<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<ConfigurePinCodeRequest>,
) -> ApiResult {
    interactive(&s, move |h| async move { h.change_pin(req.remove_pin).await }).await
}

pub async fn features<C: Connect>(State(s): State<AppState<C>>) -> ApiResult {
    interactive(&s, |h| async move { h.features().await }).await
}

/// Firmware images are uploaded as the raw request body
pub async fn firmware_update<C: Connect>(
    State(s): State<AppState<C>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult {
    let body = body.map_err(|r| ApiError::new(r.status(), r.body_text()))?;

    if body.is_empty() {
        return Err(ApiError::unprocessable("firmware image is required"));
    }
    if body.len() > FIRMWARE_MAX {
        return Err(ApiError::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("firmware image exceeds {FIRMWARE_MAX} bytes"),
        ));
    }

    info!("Updating firmware ({} bytes)", body.len());

    interactive(&s, move |h| async move { h.firmware_update(body.to_vec()).await }).await
}

pub async fn generate_mnemonic<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<GenerateMnemonicRequest>,
) -> ApiResult {
    req.validate()?;

    interactive(&s, move |h| async move {
        h.generate_mnemonic(req.word_count, req.use_passphrase)
            .await
    })
    .await
}

pub async fn recovery<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<RecoveryRequest>,
) -> ApiResult {
    req.validate()?;

    interactive(&s, move |h| async move {
        h.recovery(req.word_count, req.use_passphrase, req.dry_run)
            .await
    })
    .await
}

pub async fn set_mnemonic<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<SetMnemonicRequest>,
) -> ApiResult {
    req.validate()?;

    interactive(&s, move |h| async move { h.set_mnemonic(req.mnemonic).await }).await
}

pub async fn sign_message<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<SignMessageRequest>,
) -> ApiResult {
    let address_n = req.validate()?;

    interactive(&s, move |h| async move {
        h.sign_message(address_n, req.message).await
    })
    .await
}

pub async fn transaction_sign<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<TransactionSignRequest>,
) -> ApiResult {
    let (inputs, outputs) = req.validate()?;

    interactive(&s, move |h| async move {
        h.transaction_sign(inputs, outputs).await
    })
    .await
}

pub async fn wipe<C: Connect>(State(s): State<AppState<C>>) -> ApiResult {
    interactive(&s, |h| async move { h.wipe().await }).await
}

pub async fn connected<C: Connect>(State(s): State<AppState<C>>) -> ApiResult {
    ApiData::new(s.handle.connected().await)
}

pub async fn available<C: Connect>(State(s): State<AppState<C>>) -> ApiResult {
    ApiData::new(s.handle.available().await)
}

#[derive(Clone, Debug, Serialize)]
struct BuildInfo {
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<&'static str>,
}

pub async fn version() -> ApiResult {
    ApiData::new(BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT"),
    })
}

pub async fn pin_matrix<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<PinMatrixRequest>,
) -> ApiResult {
    debug!("Continuing with PIN matrix response");
    interactive(&s, move |h| async move { h.pin_matrix_ack(req.pin).await }).await
}

pub async fn passphrase<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<PassphraseRequest>,
) -> ApiResult {
    debug!("Continuing with passphrase");
    interactive(&s, move |h| async move {
        h.passphrase_ack(req.passphrase).await
    })
    .await
}

pub async fn word<C: Connect>(
    State(s): State<AppState<C>>,
    JsonBody(req): JsonBody<WordRequest>,
) -> ApiResult {
    debug!("Continuing with recovery word");
    interactive(&s, move |h| async move { h.word_ack(req.word).await }).await
}

pub async fn button<C: Connect>(State(s): State<AppState<C>>) -> ApiResult {
    debug!("Continuing with button acknowledgement");
    interactive(&s, |h| async move { h.button_ack().await }).await
}
