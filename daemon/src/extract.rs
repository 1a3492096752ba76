// Copyright (c) 2022-2023 The Skycoin Project

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;

use crate::response::ApiError;

/// JSON body extractor, rejections use the [ApiError] envelope
///
/// Missing or incorrect content types are rejected with 415,
/// malformed or mistyped bodies with 400.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(v)) => Ok(Self(v)),
            Err(JsonRejection::MissingJsonContentType(_)) => {
                Err(ApiError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, ""))
            }
            Err(JsonRejection::BytesRejection(r)) => Err(ApiError::new(r.status(), r.body_text())),
            Err(r) => Err(ApiError::bad_request(r.body_text())),
        }
    }
}
