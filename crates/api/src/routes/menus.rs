//! Menu route handler.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{ApiError, Result};
use crate::models::{MENU_ID, Menu};
use crate::state::AppState;
use crate::store::{Collection, StoreError};

/// Fetch the menu. Public; no token required to browse.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<Menu>> {
    let menu: Menu = state
        .store()
        .read(Collection::Menus, MENU_ID)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("menu".to_owned()),
            other => ApiError::Store(other),
        })?;
    Ok(Json(menu))
}
