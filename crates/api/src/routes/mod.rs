//! HTTP route handlers for the JSON API.
//!
//! # Route Structure
//!
//! ```text
//! POST   /api/users   - Register a new account
//! GET    /api/users   - Fetch profile           (token)
//! PUT    /api/users   - Update profile          (token)
//! DELETE /api/users   - Delete account          (token)
//!
//! POST   /api/tokens  - Login (issue a token)
//! GET    /api/tokens  - Fetch a token record
//! PUT    /api/tokens  - Extend a token
//! DELETE /api/tokens  - Revoke a token (logout)
//!
//! GET    /api/menus   - Fetch the menu
//!
//! GET    /api/carts   - Fetch cart contents     (token)
//! PUT    /api/carts   - Mutate the cart         (token)
//! DELETE /api/carts   - Clear the cart          (token)
//!
//! POST   /api/orders  - Place an order          (token)
//! GET    /api/orders  - Fetch an order          (token)
//! ```
//!
//! Authenticated routes take the bearer token id in the `token` request
//! header; the email identity is passed explicitly in the query or body and
//! cross-checked against the token's bound email.

pub mod carts;
pub mod menus;
pub mod orders;
pub mod tokens;
pub mod users;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{get, post};

use pronto_core::Email;

use crate::error::ApiError;
use crate::services::TokenService;
use crate::state::AppState;

/// Request header carrying the bearer token id.
pub const TOKEN_HEADER: &str = "token";

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            post(users::create)
                .get(users::show)
                .put(users::update)
                .delete(users::destroy),
        )
        .route(
            "/api/tokens",
            post(tokens::create)
                .get(tokens::show)
                .put(tokens::extend)
                .delete(tokens::destroy),
        )
        .route("/api/menus", get(menus::show))
        .route(
            "/api/carts",
            get(carts::show).put(carts::update).delete(carts::clear),
        )
        .route("/api/orders", post(orders::create).get(orders::show))
}

// =============================================================================
// Input validation helpers
// =============================================================================

/// The sole authorization gate: the `token` header must name a live token
/// bound to `email`. Called before any mutating operation that requires
/// identity.
pub(crate) async fn require_token(
    state: &AppState,
    headers: &HeaderMap,
    email: &Email,
) -> Result<(), ApiError> {
    let raw = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    if TokenService::new(state.store()).verify(raw, email).await {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Parse a caller-supplied email field.
pub(crate) fn parse_email(raw: &str) -> Result<Email, ApiError> {
    Email::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Require a non-blank text field, returning it trimmed.
pub(crate) fn require_text<'a>(raw: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Normalize an optional text field: blank input counts as not supplied.
pub(crate) fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}
