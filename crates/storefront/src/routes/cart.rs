//! Cart route handlers.
//!
//! The cart lives in the visitor's session; every mutation goes through
//! the [`Cart`] store's operations and is written back before responding.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tech_gadgets_core::{Price, ProductId};

use crate::catalog::types::CartItem;
use crate::error::{AppError, Result};
use crate::models::{Cart, session_keys};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: String,
    pub quantity: u32,
    pub price: Price,
    pub line_total: Price,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product.id,
            name: item.product.name.clone(),
            image_url: item.product.image_url.clone(),
            quantity: item.quantity,
            price: Price::rupees(item.product.price),
            line_total: Price::rupees(item.line_total()),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: Price,
    pub count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: Price::rupees(cart.subtotal()),
            count: cart.count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart from the session, defaulting to an empty one.
pub(crate) async fn get_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart back to the session.
pub(crate) async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Display cart contents.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = get_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add an item to the cart.
///
/// Re-adding a product that is already in the cart increments its
/// quantity instead of creating a duplicate line.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<AddToCartForm>,
) -> Result<Json<CartView>> {
    let product = state.catalog().get_product(form.product_id).await?;

    if !product.in_stock() {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.name
        )));
    }

    let mut cart = get_cart(&session).await?;
    cart.add(&product, form.quantity.unwrap_or(1));
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Set the quantity of a cart line. A quantity of zero removes it.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(form): Json<UpdateCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = get_cart(&session).await?;

    if !cart.set_quantity(form.product_id, form.quantity) {
        return Err(AppError::NotFound(format!(
            "Product {} is not in the cart",
            form.product_id
        )));
    }

    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(form): Json<RemoveFromCartForm>,
) -> Result<Json<CartView>> {
    let mut cart = get_cart(&session).await?;

    if !cart.remove(form.product_id) {
        return Err(AppError::NotFound(format!(
            "Product {} is not in the cart",
            form.product_id
        )));
    }

    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Get the cart unit count.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<serde_json::Value>> {
    let cart = get_cart(&session).await?;
    Ok(Json(serde_json::json!({ "count": cart.count() })))
}
