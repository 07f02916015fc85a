//! Core errors rendered as HTTP responses with a `{"detail": ...}` body.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use eka_core::EkaError;
use serde_json::json;

pub const UNAUTHORIZED_DETAIL: &str = "Could not validate credentials";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing bearer token")]
    MissingToken,
    #[error(transparent)]
    Core(#[from] EkaError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let core = match self {
            ApiError::MissingToken => return unauthorized(),
            ApiError::Core(e) => e,
        };
        match core {
            e if e.is_unauthorized() => unauthorized(),
            EkaError::InvalidCredentials => detail(StatusCode::UNAUTHORIZED, "Invalid email or password"),
            EkaError::DuplicateEmail => detail(StatusCode::BAD_REQUEST, "Email already registered"),
            EkaError::Validation(msg) => detail(StatusCode::BAD_REQUEST, &msg),
            EkaError::NotFound(msg) => detail(StatusCode::NOT_FOUND, &msg),
            other => {
                tracing::error!(error = %other, "request failed");
                internal_error(&other.to_string())
            }
        }
    }
}

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(json!({ "detail": UNAUTHORIZED_DETAIL })),
    )
        .into_response()
}

pub fn internal_error(msg: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "Internal server error", "error": msg })),
    )
        .into_response()
}
