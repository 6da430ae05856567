//! HTTP route handlers for the storefront.
//!
//! All endpoints speak JSON; the invoice endpoint returns PDF bytes.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the catalog)
//!
//! # Products
//! GET  /products               - Product listing (?q= name filter)
//! GET  /products/{id}          - Product detail + reviews + recommendations
//! POST /products/{id}/reviews  - Append a review
//! POST /products/{id}/buy-now  - Start a single-item checkout
//!
//! # Cart
//! GET  /cart                   - Cart contents
//! POST /cart/add               - Add to cart (re-add increments quantity)
//! POST /cart/update            - Set line quantity (0 removes)
//! POST /cart/remove            - Remove a line
//! GET  /cart/count             - Cart unit count
//!
//! # Checkout (requires auth)
//! POST /checkout/start             - Start checkout from the cart
//! GET  /checkout                   - Current checkout state
//! GET  /checkout/addresses         - Saved addresses for the user
//! POST /checkout/address           - Select a saved address
//! POST /checkout/address/new       - Save and select a new address
//! POST /checkout/method            - Choose a payment method
//! POST /checkout/upi-link          - Generate the UPI payment link
//! POST /checkout/place-order       - Submit the order
//! POST /checkout/retry             - Re-arm a failed submission
//! GET  /checkout/gateway/callback  - Gateway success callback
//! GET  /checkout/invoice           - Invoice PDF for the last order
//!
//! # Wishlist
//! GET  /wishlist               - Wishlist products
//! POST /wishlist/toggle        - Toggle a product's membership
//! POST /wishlist/remove        - Remove a product
//!
//! # Auth
//! POST /auth/login             - Login (returns pending buy-now payload)
//! POST /auth/signup            - Signup
//! POST /auth/logout            - Logout
//!
//! # Account (requires auth)
//! GET  /account                - Current user profile
//! GET  /account/orders         - Order history
//!
//! # Images
//! GET  /api/images/{filename}  - Base64 image lookup (cached)
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod images;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::add_review))
        .route("/{id}/buy-now", post(products::buy_now))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/start", post(checkout::start))
        .route("/addresses", get(checkout::addresses))
        .route("/address", post(checkout::select_address))
        .route("/address/new", post(checkout::save_address))
        .route("/method", post(checkout::choose_method))
        .route("/upi-link", post(checkout::generate_upi_link))
        .route("/place-order", post(checkout::place_order))
        .route("/retry", post(checkout::retry))
        .route("/gateway/callback", get(checkout::gateway_callback))
        .route("/invoice", get(checkout::invoice))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/remove", post(wishlist::remove))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .route("/api/images/{filename}", get(images::show))
}
