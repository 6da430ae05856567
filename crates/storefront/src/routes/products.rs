//! Product route handlers.
//!
//! Listing, detail (with reviews and recommendations), review submission,
//! and the buy-now entry into checkout.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tech_gadgets_core::ProductId;

use crate::catalog::types::{CartItem, Product, ProductSummary, Review};
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{BuyNowRedirect, session_keys};
use crate::routes::checkout::CheckoutView;
use crate::services::checkout::CheckoutSession;
use crate::state::AppState;

/// How many "you may also like" products the detail view carries.
const RECOMMENDATION_COUNT: usize = 4;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive name filter.
    pub q: Option<String>,
}

/// Product detail response: the product plus its reviews and a handful of
/// recommendations.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub reviews: Vec<Review>,
    pub recommendations: Vec<Product>,
}

/// Review submission form.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub text: String,
}

/// Buy-now form.
#[derive(Debug, Deserialize)]
pub struct BuyNowForm {
    pub quantity: Option<u32>,
}

/// Product listing, optionally filtered by name.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let mut products = state.catalog().list_products().await?;

    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let needle = q.to_lowercase();
        products.retain(|p| p.name.to_lowercase().contains(&needle));
    }

    Ok(Json(products))
}

/// Product detail with reviews and recommendations.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = state.catalog().get_product(id).await?;
    let reviews = state.catalog().get_reviews(id).await?;

    let recommendations = state
        .catalog()
        .list_products()
        .await?
        .into_iter()
        .filter(|p| p.id != id)
        .take(RECOMMENDATION_COUNT)
        .collect();

    Ok(Json(ProductDetail {
        product,
        reviews,
        recommendations,
    }))
}

/// Append a review to a product.
#[instrument(skip(state, form))]
pub async fn add_review(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(form): Json<ReviewForm>,
) -> Result<Json<Review>> {
    let text = form.text.trim();
    if text.is_empty() {
        return Err(AppError::BadRequest("Review text cannot be empty".into()));
    }

    // 404 for unknown products rather than appending orphan reviews
    state.catalog().get_product(id).await?;

    let review = state.catalog().add_review(id, text.to_string()).await?;
    Ok(Json(review))
}

/// Start a single-item checkout, bypassing the cart.
///
/// Unauthenticated visitors get the attempt parked in the session and a
/// 401 asking them to log in; the payload is handed back on the next
/// successful login so checkout can resume.
#[instrument(skip(state, session, user))]
pub async fn buy_now(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Json(form): Json<BuyNowForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1).max(1);

    if user.is_none() {
        session
            .insert(
                session_keys::BUY_NOW_REDIRECT,
                BuyNowRedirect {
                    product_id: id,
                    quantity,
                },
            )
            .await?;

        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "Please login to continue purchase",
                "login_required": true,
            })),
        )
            .into_response());
    }

    let product = state.catalog().get_product(id).await?;
    if !product.in_stock() {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.name
        )));
    }

    let checkout = CheckoutSession::new(vec![CartItem {
        product: ProductSummary::from(&product),
        quantity,
    }])?;
    session.insert(session_keys::CHECKOUT, &checkout).await?;

    Ok(Json(CheckoutView::from(&checkout)).into_response())
}
