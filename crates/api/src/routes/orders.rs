//! Order route handlers.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use pronto_core::OrderId;

use crate::error::{ApiError, Result};
use crate::models::Order;
use crate::services::OrderService;
use crate::state::AppState;

use super::{parse_email, require_token};

/// Order placement form.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub email: String,
    pub items: BTreeMap<String, u32>,
}

/// Query naming one of the caller's orders.
#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub email: String,
    pub order_id: String,
}

/// Place an order for items out of the caller's cart.
#[instrument(skip(state, headers, body))]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let email = parse_email(&body.email)?;
    require_token(&state, &headers, &email).await?;

    let order = OrderService::new(
        state.store(),
        state.payments(),
        state.notifications(),
        &state.config().stripe,
    )
    .place(&email, &body.items)
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Fetch one of the caller's orders.
#[instrument(skip(state, headers))]
pub async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Order>> {
    let email = parse_email(&query.email)?;
    require_token(&state, &headers, &email).await?;

    let order_id =
        OrderId::parse(&query.order_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let order = OrderService::new(
        state.store(),
        state.payments(),
        state.notifications(),
        &state.config().stripe,
    )
    .get(&email, &order_id)
    .await?;
    Ok(Json(order))
}
