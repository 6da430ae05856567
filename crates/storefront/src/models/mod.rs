//! Session-backed models: the current user, the cart, and the wishlist.

pub mod cart;
pub mod session;
pub mod wishlist;

pub use cart::Cart;
pub use session::{BuyNowRedirect, CurrentUser};
pub use session::keys as session_keys;
pub use wishlist::Wishlist;
