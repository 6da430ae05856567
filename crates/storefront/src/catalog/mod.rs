//! Remote catalog & account service client.
//!
//! # Architecture
//!
//! - Plain REST/JSON over `reqwest` - the service is the source of truth,
//!   NO local sync, direct API calls
//! - In-memory caching via `moka` for read-only responses (5 minute TTL)
//!
//! Products and the base64 image lookup are cached; carts, orders,
//! addresses, and authentication are never cached.
//!
//! # Example
//!
//! ```rust,ignore
//! use tech_gadgets_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog);
//!
//! // Get a product and its reviews
//! let product = client.get_product(ProductId::new(1)).await?;
//! let reviews = client.get_reviews(product.id).await?;
//! ```

mod client;
pub mod types;

pub use client::CatalogClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the service.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The service rejected the request (e.g., invalid input).
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,
        /// Error message from the service body.
        message: String,
    },
}

impl CatalogError {
    /// HTTP status of a rejection, if this error is one.
    #[must_use]
    pub const fn rejection_status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = CatalogError::Rejected {
            status: 401,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request rejected (401): Invalid credentials"
        );
    }

    #[test]
    fn test_rejection_status() {
        let err = CatalogError::Rejected {
            status: 409,
            message: "exists".to_string(),
        };
        assert_eq!(err.rejection_status(), Some(409));
        assert_eq!(
            CatalogError::NotFound("x".to_string()).rejection_status(),
            None
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CatalogError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
