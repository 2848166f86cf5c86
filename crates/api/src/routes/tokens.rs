//! Token route handlers.
//!
//! Possession of a token id is the credential for the GET/PUT/DELETE
//! operations; issuing one requires the account password.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use pronto_core::TokenId;

use crate::error::{ApiError, Result};
use crate::models::Token;
use crate::services::TokenService;
use crate::state::AppState;

use super::{parse_email, require_text};

/// Login form.
#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub email: String,
    pub password: String,
}

/// Form naming the token to extend.
#[derive(Debug, Deserialize)]
pub struct ExtendTokenRequest {
    pub id: String,
}

/// Query naming a token.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub id: String,
}

fn parse_token_id(raw: &str) -> Result<TokenId> {
    TokenId::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Login: verify the password and issue a fresh token.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateTokenRequest>,
) -> Result<Json<Token>> {
    let email = parse_email(&body.email)?;
    let password = require_text(&body.password, "password")?;

    let token = TokenService::new(state.store())
        .login(&email, password, state.hasher())
        .await?;
    Ok(Json(token))
}

/// Fetch a token record.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Token>> {
    let id = parse_token_id(&query.id)?;
    let token = TokenService::new(state.store()).get(&id).await?;
    Ok(Json(token))
}

/// Extend a live token by one lifetime.
#[instrument(skip(state, body))]
pub async fn extend(
    State(state): State<AppState>,
    Json(body): Json<ExtendTokenRequest>,
) -> Result<Json<Token>> {
    let id = parse_token_id(&body.id)?;
    let token = TokenService::new(state.store()).extend(&id).await?;
    Ok(Json(token))
}

/// Revoke a token (logout). Returns the revoked record.
#[instrument(skip_all)]
pub async fn destroy(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Token>> {
    let id = parse_token_id(&query.id)?;
    let token = TokenService::new(state.store()).revoke(&id).await?;
    Ok(Json(token))
}
