//! Session-related types.
//!
//! Types stored in the session for authentication state and the pending
//! buy-now redirect.

use serde::{Deserialize, Serialize};

use tech_gadgets_core::{Email, ProductId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's email address.
    pub email: Email,
    /// User's display name.
    pub username: String,
}

/// A buy-now attempt parked while the visitor logs in.
///
/// Stored when an unauthenticated visitor hits "buy now"; removed and
/// handed back to the client on the next successful login so checkout can
/// resume where it left off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyNowRedirect {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Session keys for per-visitor state.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the cart contents.
    pub const CART: &str = "cart";

    /// Key for the wishlist product-ID set.
    pub const WISHLIST: &str = "wishlist";

    /// Key for the active checkout session.
    pub const CHECKOUT: &str = "checkout";

    /// Key for the pending buy-now redirect payload.
    pub const BUY_NOW_REDIRECT: &str = "buy_now_redirect";

    /// Key for the most recently completed order (drives the invoice).
    pub const LAST_ORDER: &str = "last_order";
}
