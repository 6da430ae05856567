//! Account route handlers.
//!
//! Profile and order history for the logged-in user. Orders are owned by
//! the catalog service and fetched by the session user's email.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::catalog::types::OrderRecord;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Current user profile.
#[instrument(skip(user))]
pub async fn index(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}

/// Order history for the logged-in user.
#[instrument(skip(state, user))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderRecord>>> {
    let orders = state.catalog().get_orders(user.email.as_str()).await?;
    Ok(Json(orders))
}
