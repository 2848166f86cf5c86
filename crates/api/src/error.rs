//! Unified error handling for the API surface.
//!
//! Every route handler returns `Result<T, ApiError>`. The `IntoResponse`
//! implementation performs the status classification (client-error /
//! auth-error / not-found / conflict / server-error) and scrubs internal
//! causes: I/O paths and raw gateway bodies are logged, never sent to the
//! client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::services::{CartError, OrderError, TokenError, UserError};
use crate::store::StoreError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing caller input, detected before any workflow runs.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid token for the requested identity.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Token operation failed.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// User account operation failed.
    #[error("User error: {0}")]
    User(#[from] UserError),

    /// Direct store failure (menu reads and the like).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = classify(&self);

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Map an error to a response status and a short machine-checkable message
/// that does not leak internals.
fn classify(error: &ApiError) -> (StatusCode, String) {
    match error {
        ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        ApiError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            "missing or invalid token".to_owned(),
        ),
        ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),

        ApiError::Token(err) => match err {
            TokenError::NotFound => (StatusCode::NOT_FOUND, "token not found".to_owned()),
            TokenError::AlreadyExpired => (StatusCode::BAD_REQUEST, err.to_string()),
            TokenError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
            TokenError::Store(_) => internal(),
        },

        ApiError::Cart(err) => match err {
            CartError::UserNotFound => (StatusCode::NOT_FOUND, err.to_string()),
            CartError::InvalidItems(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            CartError::Store(_) => internal(),
        },

        ApiError::Order(err) => match err {
            OrderError::UserNotFound | OrderError::NotFound => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            OrderError::NoCart | OrderError::InvalidItems(_) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            OrderError::Payment(_) => (StatusCode::BAD_GATEWAY, "payment failed".to_owned()),
            OrderError::TotalOutOfRange | OrderError::Store(_) => internal(),
        },

        ApiError::User(err) => match err {
            UserError::AlreadyExists => (StatusCode::CONFLICT, err.to_string()),
            UserError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
            UserError::NothingToUpdate => (StatusCode::BAD_REQUEST, err.to_string()),
            UserError::Cascade(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "account deleted, but cleanup of owned entities failed".to_owned(),
            ),
            UserError::Store(_) => internal(),
        },

        ApiError::Store(err) => match err {
            StoreError::NotFound => (StatusCode::NOT_FOUND, "entity not found".to_owned()),
            _ => internal(),
        },
    }
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_owned(),
    )
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
