//! Wishlist route handlers.
//!
//! The wishlist is a session-persisted set of product IDs; the listing
//! joins it against the product catalog.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tech_gadgets_core::ProductId;

use crate::catalog::types::Product;
use crate::error::Result;
use crate::models::{Wishlist, session_keys};
use crate::state::AppState;

/// Wishlist display data.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub products: Vec<Product>,
    pub count: usize,
}

/// Toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub product_id: ProductId,
}

/// Toggle response data.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub product_id: ProductId,
    /// Whether the product is a member after the toggle.
    pub saved: bool,
    pub count: usize,
}

// =============================================================================
// Session Helpers
// =============================================================================

async fn get_wishlist(session: &Session) -> Result<Wishlist> {
    Ok(session
        .get::<Wishlist>(session_keys::WISHLIST)
        .await?
        .unwrap_or_default())
}

async fn save_wishlist(session: &Session, wishlist: &Wishlist) -> Result<()> {
    session.insert(session_keys::WISHLIST, wishlist).await?;
    Ok(())
}

/// Display the wishlist, joined against the catalog.
///
/// IDs whose product no longer exists are simply not shown; the set keeps
/// them until toggled off.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<WishlistView>> {
    let wishlist = get_wishlist(&session).await?;

    // No catalog round trip for an empty wishlist
    if wishlist.is_empty() {
        return Ok(Json(WishlistView {
            products: Vec::new(),
            count: 0,
        }));
    }

    let products: Vec<Product> = state
        .catalog()
        .list_products()
        .await?
        .into_iter()
        .filter(|p| wishlist.contains(p.id))
        .collect();

    Ok(Json(WishlistView {
        count: wishlist.len(),
        products,
    }))
}

/// Toggle a product's wishlist membership.
#[instrument(skip(session))]
pub async fn toggle(
    session: Session,
    Json(form): Json<ToggleForm>,
) -> Result<Json<ToggleResponse>> {
    let mut wishlist = get_wishlist(&session).await?;
    let saved = wishlist.toggle(form.product_id);
    save_wishlist(&session, &wishlist).await?;

    Ok(Json(ToggleResponse {
        product_id: form.product_id,
        saved,
        count: wishlist.len(),
    }))
}

/// Remove a product from the wishlist.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(form): Json<ToggleForm>,
) -> Result<Json<ToggleResponse>> {
    let mut wishlist = get_wishlist(&session).await?;
    wishlist.remove(form.product_id);
    save_wishlist(&session, &wishlist).await?;

    Ok(Json(ToggleResponse {
        product_id: form.product_id,
        saved: false,
        count: wishlist.len(),
    }))
}
