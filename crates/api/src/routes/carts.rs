//! Cart route handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::models::CartContents;
use crate::services::{CartAction, CartService};
use crate::state::AppState;

use super::{parse_email, require_token};

/// Cart mutation form. `action` defaults to overwrite when not supplied.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub email: String,
    pub items: CartContents,
    #[serde(default)]
    pub action: CartAction,
}

/// Query selecting a cart by owner email.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub email: String,
}

/// Response to a cart clear: what was removed.
#[derive(Debug, Serialize)]
pub struct ClearedCart {
    pub deleted_items: CartContents,
}

/// Fetch the caller's cart contents.
#[instrument(skip(state, headers))]
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CartQuery>,
) -> Result<Json<CartContents>> {
    let email = parse_email(&query.email)?;
    require_token(&state, &headers, &email).await?;

    let cart = CartService::new(state.store()).contents(&email).await?;
    Ok(Json(cart))
}

/// Mutate the caller's cart (add, remove, or overwrite).
#[instrument(skip(state, headers, body))]
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<CartContents>> {
    let email = parse_email(&body.email)?;
    require_token(&state, &headers, &email).await?;

    let cart = CartService::new(state.store())
        .apply(&email, body.action, &body.items)
        .await?;
    Ok(Json(cart))
}

/// Empty the caller's cart, reporting what was removed.
#[instrument(skip(state, headers))]
pub async fn clear(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CartQuery>,
) -> Result<Json<ClearedCart>> {
    let email = parse_email(&query.email)?;
    require_token(&state, &headers, &email).await?;

    let deleted_items = CartService::new(state.store()).clear(&email).await?;
    Ok(Json(ClearedCart { deleted_items }))
}
