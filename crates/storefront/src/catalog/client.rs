//! Catalog & account service client implementation.
//!
//! Uses `reqwest` for HTTP and caches read-only lookups (product listing,
//! base64 images) using `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use tech_gadgets_core::ProductId;

use crate::catalog::CatalogError;
use crate::catalog::types::{
    Address, AddressListResponse, ApiErrorBody, AuthUser, ImageResponse, LoginResponse,
    NewAddress, OrderConfirmation, OrderRecord, OrderSubmission, Product, Review,
    SaveAddressResponse, SignupResponse,
};
use crate::config::CatalogConfig;

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Image(String),
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the remote catalog & account service.
///
/// Provides typed access to products, reviews, addresses, orders, and
/// authentication. The product listing and image lookups are cached for
/// 5 minutes.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog service client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a GET request and parse the JSON response.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        Self::parse_response(response).await
    }

    /// Execute a POST request with a JSON body and parse the JSON response.
    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CatalogError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Check the response status and decode the body.
    ///
    /// Error bodies are decoded into the service's `{error}` shape when
    /// possible so callers can surface the service's own message.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CatalogError> {
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&response_text)
                .map_or_else(
                    |_| response_text.chars().take(200).collect::<String>(),
                    |body| body.error,
                );
            tracing::warn!(
                status = %status,
                message = %message,
                "Catalog service returned non-success status"
            );
            return Err(CatalogError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse catalog service response"
                );
                Err(CatalogError::Parse(e))
            }
        }
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get the full product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let cache_key = "products".to_string();

        // Check cache
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("/products").await?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// The service exposes only a listing endpoint, so this filters the
    /// (cached) listing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if no product has the given ID.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        self.list_products()
            .await?
            .into_iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {product_id}")))
    }

    // =========================================================================
    // Review Methods
    // =========================================================================

    /// Get all reviews for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_reviews(&self, product_id: ProductId) -> Result<Vec<Review>, CatalogError> {
        self.get_json(&format!("/reviews/{product_id}")).await
    }

    /// Append a review to a product.
    ///
    /// Reviews are timestamped at submission and are never edited or
    /// deleted afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, text), fields(product_id = %product_id))]
    pub async fn add_review(
        &self,
        product_id: ProductId,
        text: String,
    ) -> Result<Review, CatalogError> {
        let review = Review {
            product_id,
            text,
            date: Utc::now(),
        };
        self.post_json("/reviews", &review).await
    }

    // =========================================================================
    // Address Methods
    // =========================================================================

    /// Get the saved addresses for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn get_addresses(&self, email: &str) -> Result<Vec<Address>, CatalogError> {
        let response: AddressListResponse =
            self.get_json(&format!("/api/address/{email}")).await?;

        if !response.success {
            return Ok(Vec::new());
        }

        Ok(response.address.map_or_else(Vec::new, |a| a.into_vec()))
    }

    /// Save a new address for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the service rejects
    /// the address.
    #[instrument(skip(self, address))]
    pub async fn save_address(&self, address: &NewAddress) -> Result<Address, CatalogError> {
        let response: SaveAddressResponse = self.post_json("/api/save-address", address).await?;

        if !response.success {
            return Err(CatalogError::Rejected {
                status: 200,
                message: "Address was not saved".to_string(),
            });
        }

        Ok(response.address)
    }

    // =========================================================================
    // Order Methods (not cached - mutable state)
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; the caller decides how a
    /// failed submission affects the checkout state.
    #[instrument(skip(self, submission), fields(total = %submission.total, method = %submission.payment_method))]
    pub async fn submit_order(
        &self,
        submission: &OrderSubmission,
    ) -> Result<OrderConfirmation, CatalogError> {
        self.post_json("/api/orders", submission).await
    }

    /// Get the order history for a user, newest first as returned by the
    /// service.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn get_orders(&self, email: &str) -> Result<Vec<OrderRecord>, CatalogError> {
        let response = self
            .inner
            .client
            .get(self.url("/api/order"))
            .query(&[("email", email)])
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // =========================================================================
    // Authentication Methods
    // =========================================================================

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Rejected` when the service refuses the
    /// credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthUser, CatalogError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response: LoginResponse = self.post_json("/login", &body).await?;
        Ok(response.user)
    }

    /// Create a new account.
    ///
    /// Returns the service's confirmation message; signup does not log the
    /// user in.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Rejected` when the service refuses the signup.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, CatalogError> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let response: SignupResponse = self.post_json("/signup", &body).await?;
        Ok(response.message)
    }

    // =========================================================================
    // Image Methods
    // =========================================================================

    /// Look up an image by filename as a base64 data URL.
    ///
    /// Responses are cached so repeated page loads do not refetch the same
    /// asset.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(filename = %filename))]
    pub async fn get_image_base64(&self, filename: &str) -> Result<String, CatalogError> {
        let cache_key = format!("image:{filename}");

        // Check cache
        if let Some(CacheValue::Image(image)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for image");
            return Ok(image);
        }

        let response: ImageResponse = self
            .get_json(&format!("/api/image-base64/{filename}"))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Image(response.image.clone()))
            .await;

        Ok(response.image)
    }

    // =========================================================================
    // Health & Cache Management
    // =========================================================================

    /// Check that the catalog service is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or responds with
    /// a non-success status.
    pub async fn ping(&self) -> Result<(), CatalogError> {
        let response = self.inner.client.get(self.url("/products")).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(CatalogError::Rejected {
                status: response.status().as_u16(),
                message: "catalog service not ready".to_string(),
            })
        }
    }

    /// Invalidate the cached product listing.
    ///
    /// Called after an order is placed so stock quantities refresh on the
    /// next listing fetch.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate(&"products".to_string()).await;
    }
}
