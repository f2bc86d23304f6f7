use crate::core::error::Error;
use async_trait::async_trait;
use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use log::error;
use serde_json::json;

pub mod appointments;
pub mod auth;
pub mod chat;
pub mod profile;

const X_CLIENT_ID: &str = "X-Client-ID";
const X_ADMIN_ID: &str = "X-Admin-ID";

/// Maps the domain taxonomy onto HTTP statuses. Backing-store detail is
/// logged but never sent to the caller.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            Error::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Error::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Error::Conflict(message) => (StatusCode::CONFLICT, message),
            Error::Store(cause) => {
                error!("storage failure: {cause}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_owned())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

fn header_value(
    headers: &HeaderMap,
    name: &'static str,
    missing: &'static str,
    invalid: &'static str,
) -> Result<String, (StatusCode, &'static str)> {
    match headers.get(name) {
        Some(value) => value
            .to_str()
            .map(str::to_owned)
            .map_err(|_| (StatusCode::BAD_REQUEST, invalid)),
        None => Err((StatusCode::BAD_REQUEST, missing)),
    }
}

/// Caller identity for the client profile surface, as the `X-Client-ID`
/// header. Token validation belongs to the external credential service.
#[derive(Debug)]
pub struct ExtractClient(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractClient
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, (StatusCode, &'static str)> {
        header_value(
            &parts.headers,
            X_CLIENT_ID,
            "`X-Client-ID` header is missing",
            "invalid client id",
        )
        .map(ExtractClient)
    }
}

/// Caller identity for the admin profile surface.
#[derive(Debug)]
pub struct ExtractAdmin(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, (StatusCode, &'static str)> {
        header_value(
            &parts.headers,
            X_ADMIN_ID,
            "`X-Admin-ID` header is missing",
            "invalid admin id",
        )
        .map(ExtractAdmin)
    }
}
