//! Checkout workflow.
//!
//! Turns a cart (or single buy-now item) plus a chosen address and payment
//! method into a submitted order. The workflow is split in two:
//!
//! - [`CheckoutSession`] is the pure state machine, stored in the visitor's
//!   session between requests. It owns a snapshot of the items and a total
//!   computed once at entry, so concurrent cart mutation from another view
//!   cannot change the amount that gets submitted.
//! - [`CheckoutService`] drives the machine with collaborator calls
//!   (address save, UPI link generation, gateway handoff, order
//!   submission).
//!
//! States: `Building -> AddressSelected -> PaymentPending -> PaymentReady
//! -> Submitting -> Completed | Failed`. UPI requires an explicit
//! link-generation step before submission; the hosted gateway requires a
//! success callback. A failed or timed-out submission is a real `Failed`
//! transition - the order is never reported as placed unless the catalog
//! service confirmed it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use tech_gadgets_core::PaymentMethod;

use crate::catalog::types::{
    Address, CartItem, CustomerDetails, NewAddress, OrderConfirmation, OrderSubmission,
};
use crate::catalog::{CatalogClient, CatalogError};
use crate::services::payments::{GatewayCheckout, PaymentError, PaymentsClient, UpiPayment};

/// How long a submission call may run before it is treated as failed.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by the checkout workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required field is missing; the user should be re-prompted.
    #[error("missing required field: {0}")]
    Validation(String),

    /// UPI link generation failed; the user may retry.
    #[error("failed to generate UPI payment link: {0}")]
    PaymentLink(#[source] PaymentError),

    /// "Place order" was invoked for UPI before a link was generated.
    #[error("generate the UPI payment link before placing the order")]
    PaymentLinkMissing,

    /// The hosted payment gateway is not available; the user must pick
    /// another method.
    #[error("payment gateway is unavailable, please choose another payment method")]
    IntegrationUnavailable,

    /// The hosted payment gateway errored while creating a checkout.
    #[error("payment gateway error: {0}")]
    Gateway(#[source] PaymentError),

    /// The order submission call failed.
    #[error("order submission failed: {0}")]
    Submission(#[source] CatalogError),

    /// The order submission call did not complete in time.
    #[error("order submission timed out")]
    SubmissionTimeout,

    /// A collaborator call outside submission failed (address load/save).
    #[error("catalog service error: {0}")]
    Catalog(#[from] CatalogError),

    /// An operation was invoked out of order.
    #[error("invalid checkout step: {0}")]
    InvalidStep(&'static str),
}

/// Checkout session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    /// Items assembled, no address selected yet.
    Building,
    /// An address has been chosen or newly saved.
    AddressSelected,
    /// A payment method is chosen; a pre-step is still outstanding.
    PaymentPending,
    /// All pre-steps done; the order may be submitted.
    PaymentReady,
    /// The submission call is in flight.
    Submitting,
    /// The catalog service confirmed the order.
    Completed,
    /// The submission failed or timed out; retryable.
    Failed,
}

/// Client-generated provisional identifiers.
///
/// Generated before submission as time-based tokens; the identifiers
/// returned by the catalog service are authoritative and take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionalIds {
    pub order_id: String,
    pub tracking_id: String,
    pub transaction_id: String,
}

impl ProvisionalIds {
    fn generate() -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            order_id: format!("ORDER_{now}"),
            tracking_id: format!("TRK_{now}"),
            transaction_id: format!("TXN_{now}"),
        }
    }
}

/// A completed order as shown on the confirmation view and printed on the
/// invoice. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedOrder {
    pub order_id: String,
    pub tracking_id: String,
    pub transaction_id: Option<String>,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub customer: CustomerDetails,
    pub placed_at: DateTime<Utc>,
}

// =============================================================================
// CheckoutSession (pure state machine)
// =============================================================================

/// A single checkout session.
///
/// Serializable so it survives in the visitor's session between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    state: CheckoutState,
    items: Vec<CartItem>,
    /// Computed once at workflow entry; never recomputed from cart state.
    total: Decimal,
    customer: Option<CustomerDetails>,
    payment_method: Option<PaymentMethod>,
    upi: Option<UpiPayment>,
    provisional: ProvisionalIds,
    order: Option<CompletedOrder>,
}

impl CheckoutSession {
    /// Start a checkout from a snapshot of cart items.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` if the snapshot is empty.
    pub fn new(items: Vec<CartItem>) -> Result<Self, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::Validation("items".to_string()));
        }

        let total = items.iter().map(CartItem::line_total).sum();

        Ok(Self {
            state: CheckoutState::Building,
            items,
            total,
            customer: None,
            payment_method: None,
            upi: None,
            provisional: ProvisionalIds::generate(),
            order: None,
        })
    }

    /// Select a delivery address (saved or newly created).
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidStep` once submission has started.
    pub fn select_address(&mut self, address: &Address) -> Result<(), CheckoutError> {
        if self.is_closed() {
            return Err(CheckoutError::InvalidStep(
                "checkout is no longer accepting changes",
            ));
        }

        self.customer = Some(CustomerDetails::from(address));
        if self.state == CheckoutState::Building {
            self.state = CheckoutState::AddressSelected;
        }
        Ok(())
    }

    /// Choose a payment method.
    ///
    /// Card and cash-on-delivery need no pre-step and move straight to
    /// `PaymentReady`; UPI and the gateway stay at `PaymentPending` until
    /// their pre-step completes. Re-choosing discards any generated UPI
    /// link.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidStep` before an address is selected
    /// or once submission has started.
    pub fn choose_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        if self.state == CheckoutState::Building {
            return Err(CheckoutError::InvalidStep(
                "select a delivery address first",
            ));
        }
        if self.is_closed() {
            return Err(CheckoutError::InvalidStep(
                "checkout is no longer accepting changes",
            ));
        }

        self.payment_method = Some(method);
        self.upi = None;
        self.state = if method.requires_payment_link() || method.requires_gateway_handoff() {
            CheckoutState::PaymentPending
        } else {
            CheckoutState::PaymentReady
        };
        Ok(())
    }

    /// Attach a generated UPI payment link.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidStep` if UPI is not the selected
    /// method or the checkout is not awaiting a link.
    pub fn attach_upi_payment(&mut self, upi: UpiPayment) -> Result<(), CheckoutError> {
        if self.payment_method != Some(PaymentMethod::Upi) {
            return Err(CheckoutError::InvalidStep(
                "UPI is not the selected payment method",
            ));
        }
        if !matches!(
            self.state,
            CheckoutState::PaymentPending | CheckoutState::PaymentReady
        ) {
            return Err(CheckoutError::InvalidStep(
                "checkout is not awaiting a payment link",
            ));
        }

        self.upi = Some(upi);
        self.state = CheckoutState::PaymentReady;
        Ok(())
    }

    /// Record a successful gateway payment callback.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidStep` if the gateway is not the
    /// selected method or the checkout is not awaiting the callback.
    pub fn confirm_gateway(&mut self) -> Result<(), CheckoutError> {
        if self.payment_method != Some(PaymentMethod::Gateway) {
            return Err(CheckoutError::InvalidStep(
                "the gateway is not the selected payment method",
            ));
        }
        if self.state != CheckoutState::PaymentPending {
            return Err(CheckoutError::InvalidStep(
                "checkout is not awaiting a gateway callback",
            ));
        }

        self.state = CheckoutState::PaymentReady;
        Ok(())
    }

    /// Validate preconditions and move to `Submitting`.
    ///
    /// On success returns the payload to send to the catalog service. On
    /// failure the state is left untouched so the user can fix the problem
    /// and retry - a precondition violation never produces an order.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::Validation` for a missing customer field
    /// - `CheckoutError::PaymentLinkMissing` for UPI without a link
    /// - `CheckoutError::InvalidStep` for out-of-order invocation
    pub fn begin_submission(&mut self) -> Result<OrderSubmission, CheckoutError> {
        let customer = match self.state {
            CheckoutState::PaymentPending | CheckoutState::PaymentReady => self
                .customer
                .as_ref()
                .ok_or(CheckoutError::InvalidStep("no delivery address selected"))?,
            CheckoutState::Building | CheckoutState::AddressSelected => {
                return Err(CheckoutError::InvalidStep("choose a payment method first"));
            }
            CheckoutState::Submitting | CheckoutState::Completed | CheckoutState::Failed => {
                return Err(CheckoutError::InvalidStep(
                    "checkout is no longer accepting changes",
                ));
            }
        };

        if let Some(field) = customer.first_missing_field() {
            return Err(CheckoutError::Validation(field.to_string()));
        }

        let method = self
            .payment_method
            .ok_or(CheckoutError::InvalidStep("choose a payment method first"))?;

        if self.state == CheckoutState::PaymentPending {
            // A pre-step is still outstanding for this method
            if method.requires_payment_link() {
                return Err(CheckoutError::PaymentLinkMissing);
            }
            return Err(CheckoutError::InvalidStep(
                "gateway payment has not completed",
            ));
        }

        let submission = OrderSubmission {
            items: self.items.clone(),
            user_details: customer.clone(),
            total: self.total,
            payment_method: method,
            transaction_id: method
                .requires_payment_link()
                .then(|| self.provisional.transaction_id.clone()),
        };

        self.state = CheckoutState::Submitting;
        Ok(submission)
    }

    /// Record a confirmed submission and move to `Completed`.
    ///
    /// Server-returned identifiers take precedence; provisional ones fill
    /// any the service omitted.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidStep` unless a submission is in
    /// flight.
    pub fn complete(
        &mut self,
        confirmation: OrderConfirmation,
    ) -> Result<CompletedOrder, CheckoutError> {
        if self.state != CheckoutState::Submitting {
            return Err(CheckoutError::InvalidStep("no submission in flight"));
        }

        let method = self
            .payment_method
            .ok_or(CheckoutError::InvalidStep("no payment method recorded"))?;
        let customer = self
            .customer
            .clone()
            .ok_or(CheckoutError::InvalidStep("no delivery address recorded"))?;

        let order = CompletedOrder {
            order_id: confirmation
                .order_id
                .unwrap_or_else(|| self.provisional.order_id.clone()),
            tracking_id: confirmation
                .tracking_id
                .unwrap_or_else(|| self.provisional.tracking_id.clone()),
            transaction_id: confirmation.transaction_id.or_else(|| {
                method
                    .requires_payment_link()
                    .then(|| self.provisional.transaction_id.clone())
            }),
            items: self.items.clone(),
            total: self.total,
            payment_method: method,
            customer,
            placed_at: Utc::now(),
        };

        self.state = CheckoutState::Completed;
        self.order = Some(order.clone());
        Ok(order)
    }

    /// Record a failed submission and move to `Failed`.
    pub fn fail(&mut self) {
        if self.state == CheckoutState::Submitting {
            self.state = CheckoutState::Failed;
        }
    }

    /// Return a failed checkout to `PaymentReady` so submission can be
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidStep` unless the checkout failed.
    pub fn retry(&mut self) -> Result<(), CheckoutError> {
        if self.state != CheckoutState::Failed {
            return Err(CheckoutError::InvalidStep("checkout has not failed"));
        }
        self.state = CheckoutState::PaymentReady;
        Ok(())
    }

    const fn is_closed(&self) -> bool {
        matches!(
            self.state,
            CheckoutState::Submitting | CheckoutState::Completed | CheckoutState::Failed
        )
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current workflow state.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// The item snapshot taken at workflow entry.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The total computed at workflow entry.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// The selected delivery address fields, if any.
    #[must_use]
    pub const fn customer(&self) -> Option<&CustomerDetails> {
        self.customer.as_ref()
    }

    /// The chosen payment method, if any.
    #[must_use]
    pub const fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    /// The generated UPI payment, if any.
    #[must_use]
    pub const fn upi(&self) -> Option<&UpiPayment> {
        self.upi.as_ref()
    }

    /// The provisional (client-generated) order ID.
    #[must_use]
    pub fn provisional_order_id(&self) -> &str {
        &self.provisional.order_id
    }

    /// The completed order, once the checkout reached `Completed`.
    #[must_use]
    pub const fn completed_order(&self) -> Option<&CompletedOrder> {
        self.order.as_ref()
    }
}

// =============================================================================
// CheckoutService (async driver)
// =============================================================================

/// Drives a [`CheckoutSession`] with collaborator calls.
pub struct CheckoutService<'a> {
    catalog: &'a CatalogClient,
    payments: &'a PaymentsClient,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(catalog: &'a CatalogClient, payments: &'a PaymentsClient) -> Self {
        Self { catalog, payments }
    }

    /// Save a new address and select it for this checkout.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` if name, address, or email is
    /// empty; on success the address joins the saved list and becomes the
    /// selected one.
    #[instrument(skip(self, checkout, new_address))]
    pub async fn save_new_address(
        &self,
        checkout: &mut CheckoutSession,
        new_address: NewAddress,
    ) -> Result<Address, CheckoutError> {
        for (field, value) in [
            ("name", &new_address.name),
            ("address", &new_address.address),
            ("email", &new_address.email),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::Validation(field.to_string()));
            }
        }

        let saved = self.catalog.save_address(&new_address).await?;
        checkout.select_address(&saved)?;
        Ok(saved)
    }

    /// Generate the UPI payment link for this checkout.
    ///
    /// On failure the checkout stays at `PaymentPending` and the user may
    /// retry.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::PaymentLink` when generation fails.
    #[instrument(skip(self, checkout))]
    pub async fn generate_upi_link(
        &self,
        checkout: &mut CheckoutSession,
    ) -> Result<UpiPayment, CheckoutError> {
        if checkout.payment_method() != Some(PaymentMethod::Upi) {
            return Err(CheckoutError::InvalidStep(
                "UPI is not the selected payment method",
            ));
        }

        let upi = self
            .payments
            .generate_upi_link(checkout.total(), checkout.provisional_order_id())
            .await
            .map_err(CheckoutError::PaymentLink)?;

        checkout.attach_upi_payment(upi.clone())?;
        Ok(upi)
    }

    /// Hand control to the hosted payment gateway.
    ///
    /// Returns the checkout page the client should be redirected to. On
    /// the gateway's success callback, [`CheckoutSession::confirm_gateway`]
    /// and then [`Self::place_order`] complete the flow.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::IntegrationUnavailable` when no gateway is
    /// configured - the attempt aborts visibly rather than proceeding.
    #[instrument(skip(self, checkout))]
    pub async fn begin_gateway_handoff(
        &self,
        checkout: &CheckoutSession,
    ) -> Result<GatewayCheckout, CheckoutError> {
        if checkout.payment_method() != Some(PaymentMethod::Gateway) {
            return Err(CheckoutError::InvalidStep(
                "the gateway is not the selected payment method",
            ));
        }

        let customer = checkout
            .customer()
            .ok_or(CheckoutError::InvalidStep("no delivery address selected"))?;
        if let Some(field) = customer.first_missing_field() {
            return Err(CheckoutError::Validation(field.to_string()));
        }

        self.payments
            .create_gateway_checkout(checkout.total(), checkout.provisional_order_id(), customer)
            .await
            .map_err(|e| match e {
                PaymentError::GatewayUnavailable => CheckoutError::IntegrationUnavailable,
                other => CheckoutError::Gateway(other),
            })
    }

    /// Submit the order to the catalog service.
    ///
    /// The submission runs under [`SUBMIT_TIMEOUT`]; an error or expiry is
    /// a real `Failed` transition. The confirmation view is only reached
    /// when the service confirmed the order.
    ///
    /// # Errors
    ///
    /// Propagates precondition violations from
    /// [`CheckoutSession::begin_submission`], and returns
    /// `CheckoutError::Submission`/`SubmissionTimeout` on failure.
    #[instrument(skip(self, checkout))]
    pub async fn place_order(
        &self,
        checkout: &mut CheckoutSession,
    ) -> Result<CompletedOrder, CheckoutError> {
        let submission = checkout.begin_submission()?;

        match tokio::time::timeout(SUBMIT_TIMEOUT, self.catalog.submit_order(&submission)).await {
            Ok(Ok(confirmation)) => {
                // Stock changed server-side; refresh the listing cache
                self.catalog.invalidate_products().await;
                checkout.complete(confirmation)
            }
            Ok(Err(e)) => {
                checkout.fail();
                Err(CheckoutError::Submission(e))
            }
            Err(_) => {
                checkout.fail();
                Err(CheckoutError::SubmissionTimeout)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::types::{Product, ProductSummary};
    use crate::config::CatalogConfig;
    use crate::models::Cart;
    use tech_gadgets_core::ProductId;

    fn item(id: i32, price: i64, quantity: u32) -> CartItem {
        CartItem {
            product: ProductSummary {
                id: ProductId::new(id),
                name: format!("Widget {id}"),
                price: Decimal::from(price),
                image_url: format!("widget{id}.jpg"),
            },
            quantity,
        }
    }

    fn filled_address() -> Address {
        Address {
            id: Some(tech_gadgets_core::AddressId::new(1)),
            name: "Asha".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            pincode: "560001".to_string(),
            phone: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
        }
    }

    fn upi_payment() -> UpiPayment {
        UpiPayment {
            link: "upi://pay?pa=store@upi&am=1000".to_string(),
            qr_data: "upi://pay?pa=store@upi&am=1000".to_string(),
        }
    }

    #[test]
    fn test_empty_items_rejected() {
        assert!(matches!(
            CheckoutSession::new(Vec::new()),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let checkout = CheckoutSession::new(vec![item(1, 500, 2), item(2, 250, 1)]).unwrap();
        assert_eq!(checkout.total(), Decimal::from(1250));
    }

    #[test]
    fn test_total_immune_to_later_cart_mutation() {
        let mut cart = Cart::default();
        cart.add(
            &Product {
                id: ProductId::new(1),
                name: "Widget".to_string(),
                description: String::new(),
                price: Decimal::from(500),
                image_url: "widget.jpg".to_string(),
                quantity: 10,
            },
            2,
        );

        let checkout = CheckoutSession::new(cart.snapshot()).unwrap();

        // The cart keeps changing in another view; the checkout total does not
        cart.set_quantity(ProductId::new(1), 9);
        cart.clear();

        assert_eq!(checkout.total(), Decimal::from(1000));
        assert_eq!(checkout.items().len(), 1);
    }

    #[test]
    fn test_method_requires_address_first() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        assert!(matches!(
            checkout.choose_method(PaymentMethod::CreditCard),
            Err(CheckoutError::InvalidStep(_))
        ));
        assert_eq!(checkout.state(), CheckoutState::Building);
    }

    #[test]
    fn test_submission_without_address_never_completes() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        assert!(checkout.begin_submission().is_err());
        assert_eq!(checkout.state(), CheckoutState::Building);
        assert!(checkout.completed_order().is_none());
    }

    #[test]
    fn test_submission_with_missing_field_never_completes() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        let mut address = filled_address();
        address.pincode = String::new();

        checkout.select_address(&address).unwrap();
        checkout.choose_method(PaymentMethod::CashOnDelivery).unwrap();

        let err = checkout.begin_submission().unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(field) if field == "pincode"));
        assert_eq!(checkout.state(), CheckoutState::PaymentReady);
        assert!(checkout.completed_order().is_none());
    }

    #[test]
    fn test_card_and_cod_skip_pre_step() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();

        checkout.choose_method(PaymentMethod::CreditCard).unwrap();
        assert_eq!(checkout.state(), CheckoutState::PaymentReady);

        checkout.choose_method(PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(checkout.state(), CheckoutState::PaymentReady);
    }

    #[test]
    fn test_upi_submit_before_link_stays_pending() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::Upi).unwrap();
        assert_eq!(checkout.state(), CheckoutState::PaymentPending);

        let err = checkout.begin_submission().unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentLinkMissing));
        assert_eq!(checkout.state(), CheckoutState::PaymentPending);
        assert!(checkout.completed_order().is_none());
    }

    #[test]
    fn test_upi_submits_after_link_generation() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 2)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::Upi).unwrap();
        checkout.attach_upi_payment(upi_payment()).unwrap();
        assert_eq!(checkout.state(), CheckoutState::PaymentReady);

        let submission = checkout.begin_submission().unwrap();
        assert_eq!(checkout.state(), CheckoutState::Submitting);
        // UPI submissions carry the provisional transaction ID
        assert!(submission.transaction_id.is_some());
    }

    #[test]
    fn test_re_choosing_method_discards_upi_link() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::Upi).unwrap();
        checkout.attach_upi_payment(upi_payment()).unwrap();

        checkout.choose_method(PaymentMethod::Upi).unwrap();
        assert!(checkout.upi().is_none());
        assert_eq!(checkout.state(), CheckoutState::PaymentPending);
    }

    #[test]
    fn test_cod_scenario_completes_with_total_and_order_id() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 2)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::CashOnDelivery).unwrap();

        let submission = checkout.begin_submission().unwrap();
        assert_eq!(submission.total, Decimal::from(1000));
        assert!(submission.transaction_id.is_none());

        // Service confirmed but returned no identifiers; provisional ones hold
        let order = checkout.complete(OrderConfirmation {
            order_id: None,
            tracking_id: None,
            transaction_id: None,
        })
        .unwrap();

        assert_eq!(checkout.state(), CheckoutState::Completed);
        assert_eq!(order.total, Decimal::from(1000));
        assert!(order.order_id.starts_with("ORDER_"));
    }

    #[test]
    fn test_server_identifiers_take_precedence() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::CreditCard).unwrap();
        checkout.begin_submission().unwrap();

        let order = checkout.complete(OrderConfirmation {
            order_id: Some("42".to_string()),
            tracking_id: Some("TRK_SERVER".to_string()),
            transaction_id: None,
        })
        .unwrap();

        assert_eq!(order.order_id, "42");
        assert_eq!(order.tracking_id, "TRK_SERVER");
        assert!(order.transaction_id.is_none());
    }

    #[test]
    fn test_failed_submission_is_retryable() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::CashOnDelivery).unwrap();
        checkout.begin_submission().unwrap();

        checkout.fail();
        assert_eq!(checkout.state(), CheckoutState::Failed);
        assert!(checkout.completed_order().is_none());

        checkout.retry().unwrap();
        assert_eq!(checkout.state(), CheckoutState::PaymentReady);
        assert!(checkout.begin_submission().is_ok());
    }

    #[test]
    fn test_gateway_requires_callback_before_submission() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::Gateway).unwrap();
        assert_eq!(checkout.state(), CheckoutState::PaymentPending);

        assert!(matches!(
            checkout.begin_submission(),
            Err(CheckoutError::InvalidStep(_))
        ));

        checkout.confirm_gateway().unwrap();
        assert_eq!(checkout.state(), CheckoutState::PaymentReady);
        assert!(checkout.begin_submission().is_ok());
    }

    #[test]
    fn test_completed_checkout_rejects_further_changes() {
        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::CashOnDelivery).unwrap();
        checkout.begin_submission().unwrap();
        checkout
            .complete(OrderConfirmation {
                order_id: None,
                tracking_id: None,
                transaction_id: None,
            })
            .unwrap();

        assert!(checkout.select_address(&filled_address()).is_err());
        assert!(checkout.choose_method(PaymentMethod::Upi).is_err());
        assert!(checkout.begin_submission().is_err());
    }

    #[tokio::test]
    async fn test_gateway_handoff_unavailable_without_config() {
        let catalog = CatalogClient::new(&CatalogConfig {
            base_url: "http://127.0.0.1:5000".to_string(),
        });
        let payments = PaymentsClient::new(
            &CatalogConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
            },
            None,
            "http://localhost:3000",
        );
        let service = CheckoutService::new(&catalog, &payments);

        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        checkout.select_address(&filled_address()).unwrap();
        checkout.choose_method(PaymentMethod::Gateway).unwrap();

        let err = service.begin_gateway_handoff(&checkout).await.unwrap_err();
        assert!(matches!(err, CheckoutError::IntegrationUnavailable));
        // The attempt aborts without touching the workflow state
        assert_eq!(checkout.state(), CheckoutState::PaymentPending);
    }

    #[tokio::test]
    async fn test_save_new_address_validates_required_fields() {
        let catalog = CatalogClient::new(&CatalogConfig {
            base_url: "http://127.0.0.1:5000".to_string(),
        });
        let payments = PaymentsClient::new(
            &CatalogConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
            },
            None,
            "http://localhost:3000",
        );
        let service = CheckoutService::new(&catalog, &payments);

        let mut checkout = CheckoutSession::new(vec![item(1, 500, 1)]).unwrap();
        let err = service
            .save_new_address(
                &mut checkout,
                NewAddress {
                    name: String::new(),
                    address: "12 MG Road".to_string(),
                    city: "Bengaluru".to_string(),
                    email: "asha@example.com".to_string(),
                    pincode: "560001".to_string(),
                    phone: "9876543210".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(field) if field == "name"));
        assert_eq!(checkout.state(), CheckoutState::Building);
    }
}
