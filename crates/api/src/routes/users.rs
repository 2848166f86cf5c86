//! User account route handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::models::UserProfile;
use crate::services::{ProfileChanges, UserService};
use crate::state::AppState;

use super::{optional_text, parse_email, require_text, require_token};

/// Registration form.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

/// Profile update form. `email` selects the account; the rest are the
/// changes, at least one of which must be supplied.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
}

/// Query selecting an account by email.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub email: String,
}

/// Register a new account.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<StatusCode> {
    let username = require_text(&body.username, "username")?;
    let email = parse_email(&body.email)?;
    let password = require_text(&body.password, "password")?;
    let address = require_text(&body.address, "address")?;

    UserService::new(state.store(), state.hasher())
        .register(username, email, password, address)
        .await?;
    Ok(StatusCode::CREATED)
}

/// Fetch the caller's profile.
#[instrument(skip(state, headers))]
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserProfile>> {
    let email = parse_email(&query.email)?;
    require_token(&state, &headers, &email).await?;

    let profile = UserService::new(state.store(), state.hasher())
        .profile(&email)
        .await?;
    Ok(Json(profile))
}

/// Update the caller's profile.
#[instrument(skip(state, headers, body))]
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>> {
    let email = parse_email(&body.email)?;
    require_token(&state, &headers, &email).await?;

    let changes = ProfileChanges {
        username: optional_text(body.username),
        password: optional_text(body.password),
        address: optional_text(body.address),
    };
    let profile = UserService::new(state.store(), state.hasher())
        .update(&email, changes)
        .await?;
    Ok(Json(profile))
}

/// Delete the caller's account, cascading to its cart and orders.
#[instrument(skip(state, headers))]
pub async fn destroy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserProfile>> {
    let email = parse_email(&query.email)?;
    require_token(&state, &headers, &email).await?;

    let profile = UserService::new(state.store(), state.hasher())
        .remove(&email)
        .await?;
    Ok(Json(profile))
}
