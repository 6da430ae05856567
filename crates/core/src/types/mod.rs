//! Core types for the Tech Gadgets storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod payment;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use payment::PaymentMethod;
pub use price::Price;
