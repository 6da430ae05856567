//! Checkout route handlers.
//!
//! Each handler loads the active [`CheckoutSession`] from the visitor's
//! session, drives one workflow step, and writes the session back before
//! responding - including on failure, so a `Failed` submission is
//! persisted rather than papered over.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tech_gadgets_core::{AddressId, PaymentMethod, Price};

use crate::catalog::types::{Address, CartItem, CustomerDetails, NewAddress};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::session_keys;
use crate::routes::cart::{get_cart, save_cart};
use crate::services::checkout::{
    CheckoutError, CheckoutService, CheckoutSession, CheckoutState, CompletedOrder,
};
use crate::services::invoice::{invoice_filename, render_invoice};
use crate::services::payments::UpiPayment;
use crate::state::AppState;

/// Checkout display data.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub state: CheckoutState,
    pub items: Vec<CartItem>,
    pub total: Price,
    pub customer: Option<CustomerDetails>,
    pub payment_method: Option<PaymentMethod>,
    pub upi: Option<UpiPayment>,
    pub order: Option<CompletedOrder>,
}

impl From<&CheckoutSession> for CheckoutView {
    fn from(checkout: &CheckoutSession) -> Self {
        Self {
            state: checkout.state(),
            items: checkout.items().to_vec(),
            total: Price::rupees(checkout.total()),
            customer: checkout.customer().cloned(),
            payment_method: checkout.payment_method(),
            upi: checkout.upi().cloned(),
            order: checkout.completed_order().cloned(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the active checkout session.
async fn load_checkout(session: &Session) -> Result<CheckoutSession> {
    session
        .get::<CheckoutSession>(session_keys::CHECKOUT)
        .await?
        .ok_or_else(|| AppError::BadRequest("No active checkout session".into()))
}

/// Write the checkout session back.
async fn save_checkout(session: &Session, checkout: &CheckoutSession) -> Result<()> {
    session.insert(session_keys::CHECKOUT, checkout).await?;
    Ok(())
}

// =============================================================================
// Form Types
// =============================================================================

/// Saved-address selection form.
#[derive(Debug, Deserialize)]
pub struct SelectAddressForm {
    pub address_id: AddressId,
}

/// New-address form. Email defaults to the logged-in user's address.
#[derive(Debug, Deserialize)]
pub struct NewAddressForm {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub email: Option<String>,
    pub pincode: String,
    pub phone: String,
}

/// Payment-method selection form.
#[derive(Debug, Deserialize)]
pub struct ChooseMethodForm {
    pub method: PaymentMethod,
}

/// Query parameters of the gateway success callback.
#[derive(Debug, Deserialize)]
pub struct GatewayCallbackQuery {
    /// The order reference the gateway was given at handoff.
    pub reference: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Start a checkout from the current cart.
///
/// The item snapshot and total are fixed here; later cart edits do not
/// affect this checkout.
#[instrument(skip(session))]
pub async fn start(RequireAuth(_user): RequireAuth, session: Session) -> Result<Json<CheckoutView>> {
    let cart = get_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let checkout = CheckoutSession::new(cart.snapshot())?;
    save_checkout(&session, &checkout).await?;

    Ok(Json(CheckoutView::from(&checkout)))
}

/// Current checkout state.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CheckoutView>> {
    let checkout = load_checkout(&session).await?;
    Ok(Json(CheckoutView::from(&checkout)))
}

/// Saved addresses for the logged-in user.
#[instrument(skip(state, user))]
pub async fn addresses(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Address>>> {
    let addresses = state.catalog().get_addresses(user.email.as_str()).await?;
    Ok(Json(addresses))
}

/// Select a saved address for this checkout.
#[instrument(skip(state, session, user))]
pub async fn select_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(form): Json<SelectAddressForm>,
) -> Result<Json<CheckoutView>> {
    let mut checkout = load_checkout(&session).await?;

    let address = state
        .catalog()
        .get_addresses(user.email.as_str())
        .await?
        .into_iter()
        .find(|a| a.id == Some(form.address_id))
        .ok_or_else(|| AppError::NotFound(format!("Address {} not found", form.address_id)))?;

    checkout.select_address(&address)?;
    save_checkout(&session, &checkout).await?;

    Ok(Json(CheckoutView::from(&checkout)))
}

/// Save a new address and select it for this checkout.
#[instrument(skip(state, session, user, form))]
pub async fn save_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(form): Json<NewAddressForm>,
) -> Result<Json<CheckoutView>> {
    let mut checkout = load_checkout(&session).await?;

    let new_address = NewAddress {
        name: form.name,
        address: form.address,
        city: form.city,
        email: form
            .email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| user.email.to_string()),
        pincode: form.pincode,
        phone: form.phone,
    };

    let service = CheckoutService::new(state.catalog(), state.payments());
    service.save_new_address(&mut checkout, new_address).await?;
    save_checkout(&session, &checkout).await?;

    Ok(Json(CheckoutView::from(&checkout)))
}

/// Choose a payment method.
///
/// Selecting the hosted gateway when none is configured is rejected up
/// front so the user can pick another method.
#[instrument(skip(state, session))]
pub async fn choose_method(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<ChooseMethodForm>,
) -> Result<Json<CheckoutView>> {
    if form.method.requires_gateway_handoff() && !state.payments().gateway_available() {
        return Err(CheckoutError::IntegrationUnavailable.into());
    }

    let mut checkout = load_checkout(&session).await?;
    checkout.choose_method(form.method)?;
    save_checkout(&session, &checkout).await?;

    Ok(Json(CheckoutView::from(&checkout)))
}

/// Generate the UPI payment link.
///
/// Failure keeps the checkout at `PaymentPending`; the user may retry.
#[instrument(skip(state, session))]
pub async fn generate_upi_link(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutView>> {
    let mut checkout = load_checkout(&session).await?;

    let service = CheckoutService::new(state.catalog(), state.payments());
    service.generate_upi_link(&mut checkout).await?;
    save_checkout(&session, &checkout).await?;

    Ok(Json(CheckoutView::from(&checkout)))
}

/// Place the order.
///
/// For the hosted gateway this first responds with the checkout page to
/// redirect to; submission happens on the gateway's success callback. For
/// every other method the order is submitted here. A submission error or
/// timeout leaves the checkout `Failed` and is reported as such - no
/// confirmation is fabricated.
#[instrument(skip(state, session))]
pub async fn place_order(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut checkout = load_checkout(&session).await?;
    let service = CheckoutService::new(state.catalog(), state.payments());

    // Gateway payments need the external checkout page first
    if checkout.payment_method() == Some(PaymentMethod::Gateway)
        && checkout.state() == CheckoutState::PaymentPending
    {
        let gateway = service.begin_gateway_handoff(&checkout).await?;
        return Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "state": checkout.state(),
                "gateway": gateway,
            })),
        )
            .into_response());
    }

    let result = service.place_order(&mut checkout).await;
    // Persist the outcome either way: Completed on success, Failed on error
    save_checkout(&session, &checkout).await?;

    let order = result?;
    finish_order(&session, &order).await?;

    Ok(Json(CheckoutView::from(&checkout)).into_response())
}

/// Re-arm a failed submission for another attempt.
#[instrument(skip(session))]
pub async fn retry(session: Session) -> Result<Json<CheckoutView>> {
    let mut checkout = load_checkout(&session).await?;
    checkout.retry()?;
    save_checkout(&session, &checkout).await?;

    Ok(Json(CheckoutView::from(&checkout)))
}

/// Gateway success callback: record the payment and submit the order.
#[instrument(skip(state, session))]
pub async fn gateway_callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<GatewayCallbackQuery>,
) -> Result<Json<CheckoutView>> {
    let mut checkout = load_checkout(&session).await?;

    // The callback must belong to this checkout's handoff
    if let Some(reference) = query.reference.as_deref()
        && reference != checkout.provisional_order_id()
    {
        return Err(AppError::BadRequest(
            "Gateway callback does not match the active checkout".into(),
        ));
    }

    checkout.confirm_gateway()?;

    let service = CheckoutService::new(state.catalog(), state.payments());
    let result = service.place_order(&mut checkout).await;
    save_checkout(&session, &checkout).await?;

    let order = result?;
    finish_order(&session, &order).await?;

    Ok(Json(CheckoutView::from(&checkout)))
}

/// Invoice PDF for the most recently completed order.
#[instrument(skip(session))]
pub async fn invoice(session: Session) -> Result<Response> {
    let order = session
        .get::<CompletedOrder>(session_keys::LAST_ORDER)
        .await?
        .ok_or_else(|| AppError::NotFound("No completed order to invoice".into()))?;

    let bytes = render_invoice(&order)?;
    let filename = invoice_filename(&order.order_id);

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Post-completion bookkeeping: remember the order for the invoice and
/// empty the cart.
async fn finish_order(session: &Session, order: &CompletedOrder) -> Result<()> {
    session.insert(session_keys::LAST_ORDER, order).await?;

    let mut cart = get_cart(session).await?;
    cart.clear();
    save_cart(session, &cart).await?;

    Ok(())
}
