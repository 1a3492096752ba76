// Copyright (c) 2022-2023 The Skycoin Project

//! JSON response envelope and error mapping
//!
//! Every response is `{ "data": T }` or `{ "error": { "message", "code" } }`,
//! with `code` matching the HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::Serialize;

use skywallet::{engine::Outcome, Error, Reply};

/// Non-standard status for requests closed (or timed out) before completion
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Response envelope
#[derive(Clone, Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: u16,
}

/// Successful response data
#[derive(Clone, Debug)]
pub struct ApiData(serde_json::Value);

/// Error response
#[derive(Clone, PartialEq, Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

pub type ApiResult = Result<ApiData, ApiError>;

impl ApiData {
    /// Build response data from a serialisable value
    pub fn new(v: impl Serialize) -> ApiResult {
        match serde_json::to_value(v) {
            Ok(v) => Ok(Self(v)),
            Err(e) => Err(ApiError::internal(e)),
        }
    }
}

impl IntoResponse for ApiData {
    fn into_response(self) -> Response {
        let body = Envelope::<serde_json::Value> {
            data: Some(self.0),
            error: None,
        };

        (StatusCode::OK, Json(body)).into_response()
    }
}

impl ApiError {
    /// Create an error response, an empty message uses the status reason
    pub fn new(status: StatusCode, message: impl ToString) -> Self {
        let mut message = message.to_string();
        if message.is_empty() {
            message = status.canonical_reason().unwrap_or_default().to_string();
        }

        Self { status, message }
    }

    pub fn bad_request(message: impl ToString) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl ToString) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl ToString) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Request cancelled by the client or timed out
    pub fn client_closed() -> Self {
        match StatusCode::from_u16(CLIENT_CLOSED_REQUEST) {
            Ok(status) => Self::new(status, "Client Closed Request"),
            Err(_) => Self::new(StatusCode::REQUEST_TIMEOUT, ""),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope::<()> {
            data: None,
            error: Some(ErrorBody {
                message: self.message,
                code: self.status.as_u16(),
            }),
        };

        (self.status, Json(body)).into_response()
    }
}

/// Map session errors to HTTP errors
impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::Busy => StatusCode::SERVICE_UNAVAILABLE,
            Error::NoPendingPrompt(_) => StatusCode::CONFLICT,
            Error::Unsupported(..) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => error!("Device request failed: {}", e),
            _ => warn!("Device request rejected: {}", e),
        }

        Self::new(status, e)
    }
}

/// Map a device reply to a response
///
/// Prompts respond with the prompt name, device failures are conflicts.
pub fn reply(r: Reply) -> ApiResult {
    let o = match r {
        Reply::Prompt(p) => return ApiData::new(p.to_string()),
        Reply::Done(o) => o,
    };

    match o {
        Outcome::Success(m) => ApiData::new(m),
        Outcome::Failure { code, message } => {
            warn!("Device failure ({}): {}", code, message);
            Err(ApiError::new(StatusCode::CONFLICT, message))
        }
        Outcome::Addresses(a) => ApiData::new(a),
        Outcome::Features(f) => ApiData::new(f),
        Outcome::Signature(s) => ApiData::new(s),
        Outcome::Signatures(s) => ApiData::new(s),
    }
}
