// Copyright (c) 2022-2023 The Skycoin Project

//! Skywallet HTTP daemon
//!
//! Exposes a single [DeviceHandle] over a JSON API under `/api/v1`, see
//! [router] for the available endpoints.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use log::warn;
use tower_http::cors::{AllowOrigin, CorsLayer};

use skywallet::{Connect, DeviceHandle};

pub mod config;
pub mod response;

mod api;
mod extract;
mod validate;

use response::ApiError;

/// Origins always permitted by CORS
const LOCAL_ORIGINS: &[&str] = &[
    "http://localhost",
    "http://127.0.0.1",
    "https://localhost",
    "https://127.0.0.1",
];

/// Shared handler state
pub struct AppState<C: Connect> {
    pub handle: DeviceHandle<C>,
    pub request_timeout: Duration,
}

impl<C: Connect> AppState<C> {
    pub fn new(handle: DeviceHandle<C>, request_timeout: Duration) -> Self {
        Self {
            handle,
            request_timeout,
        }
    }
}

impl<C: Connect> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

/// Build the API router
///
/// `allowed_origins` are permitted in addition to localhost.
pub fn router<C: Connect>(state: AppState<C>, allowed_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/generate_addresses", post(api::generate_addresses::<C>))
        .route("/apply_settings", post(api::apply_settings::<C>))
        .route("/backup", post(api::backup::<C>))
        .route("/cancel", put(api::cancel::<C>))
        .route(
            "/check_message_signature",
            post(api::check_message_signature::<C>),
        )
        .route("/configure_pin_code", post(api::configure_pin_code::<C>))
        .route("/features", get(api::features::<C>))
        .route(
            "/firmware_update",
            put(api::firmware_update::<C>)
                .layer(DefaultBodyLimit::max(2 * validate::FIRMWARE_MAX)),
        )
        .route("/generate_mnemonic", post(api::generate_mnemonic::<C>))
        .route("/recovery", post(api::recovery::<C>))
        .route("/set_mnemonic", post(api::set_mnemonic::<C>))
        .route("/sign_message", post(api::sign_message::<C>))
        .route("/transaction_sign", post(api::transaction_sign::<C>))
        .route("/wipe", delete(api::wipe::<C>))
        .route("/connected", get(api::connected::<C>))
        .route("/available", get(api::available::<C>))
        .route("/version", get(api::version))
        .route("/intermediate/pin_matrix", post(api::pin_matrix::<C>))
        .route("/intermediate/passphrase", post(api::passphrase::<C>))
        .route("/intermediate/word", post(api::word::<C>))
        .route("/intermediate/button", post(api::button::<C>));

    Router::new()
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(middleware::map_response(method_not_allowed))
        .layer(cors(allowed_origins))
        .with_state(state)
}

fn cors(allowed_origins: &[String]) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = LOCAL_ORIGINS
        .iter()
        .map(|o| HeaderValue::from_static(o))
        .collect();

    for o in allowed_origins {
        match HeaderValue::from_str(o) {
            Ok(v) => origins.push(v),
            Err(_) => warn!("Ignoring invalid CORS origin: {}", o),
        }
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "")
}

/// Rewrite axum's bare 405 responses into the error envelope
async fn method_not_allowed(r: Response) -> Response {
    match r.status() {
        StatusCode::METHOD_NOT_ALLOWED => {
            let (mut parts, _) = r.into_parts();
            parts.headers.remove(header::CONTENT_LENGTH);
            let e = ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "").into_response();
            let (e_parts, body) = e.into_parts();
            parts.headers.extend(e_parts.headers);
            Response::from_parts(parts, body)
        }
        _ => r,
    }
}
