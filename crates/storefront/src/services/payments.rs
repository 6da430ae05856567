//! Payment collaborator clients.
//!
//! Two collaborators live here: the UPI link generator exposed by the
//! catalog service, and an optional hosted payment gateway that runs its
//! own checkout page and calls back on success. The gateway is configured
//! via environment; when unconfigured the method is unavailable and
//! checkout reports that to the user instead of proceeding silently.

use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::catalog::types::CustomerDetails;
use crate::config::{CatalogConfig, GatewayConfig};

/// Errors from the payment collaborators.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The collaborator rejected the request.
    #[error("Payment service rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The hosted gateway is not configured.
    #[error("payment gateway is not configured")]
    GatewayUnavailable,
}

/// A generated UPI payment: deep link plus QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpiPayment {
    /// UPI deep link (upi://pay?...).
    pub link: String,
    /// Payload to render as a QR code.
    pub qr_data: String,
}

/// A hosted gateway checkout session the client should be redirected to.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayCheckout {
    /// Gateway-assigned session ID.
    pub id: String,
    /// Hosted checkout page URL.
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpiLinkResponse {
    upi_link: String,
    qr_data: String,
}

#[derive(Debug, Deserialize)]
struct GatewaySessionResponse {
    id: String,
    url: String,
}

// =============================================================================
// PaymentsClient
// =============================================================================

/// Client for the payment collaborators.
#[derive(Clone)]
pub struct PaymentsClient {
    inner: Arc<PaymentsClientInner>,
}

struct PaymentsClientInner {
    client: reqwest::Client,
    upi_endpoint: String,
    gateway: Option<GatewayConfig>,
    callback_url: String,
}

impl PaymentsClient {
    /// Create a new payments client.
    ///
    /// `base_url` is the storefront's public URL, used to build the gateway
    /// success-callback address.
    #[must_use]
    pub fn new(catalog: &CatalogConfig, gateway: Option<GatewayConfig>, base_url: &str) -> Self {
        Self {
            inner: Arc::new(PaymentsClientInner {
                client: reqwest::Client::new(),
                upi_endpoint: format!("{}/api/generate-upi-link", catalog.base_url),
                gateway,
                callback_url: format!(
                    "{}/checkout/gateway/callback",
                    base_url.trim_end_matches('/')
                ),
            }),
        }
    }

    /// Whether the hosted gateway is configured.
    #[must_use]
    pub fn gateway_available(&self) -> bool {
        self.inner.gateway.is_some()
    }

    /// Generate a UPI payment link and QR payload for the given amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator is unreachable or rejects the
    /// request; the checkout stays where it was and the user may retry.
    #[instrument(skip(self), fields(amount = %amount, order_id = %order_id))]
    pub async fn generate_upi_link(
        &self,
        amount: Decimal,
        order_id: &str,
    ) -> Result<UpiPayment, PaymentError> {
        let body = serde_json::json!({ "amount": amount, "orderId": order_id });

        let response = self
            .inner
            .client
            .post(&self.inner.upi_endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let link: UpiLinkResponse = response.json().await?;
        Ok(UpiPayment {
            link: link.upi_link,
            qr_data: link.qr_data,
        })
    }

    /// Create a hosted gateway checkout session.
    ///
    /// Amounts are sent in minor currency units, as gateways expect.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::GatewayUnavailable` when no gateway is
    /// configured, otherwise transport or rejection errors.
    #[instrument(skip(self, customer), fields(amount = %amount, order_id = %order_id))]
    pub async fn create_gateway_checkout(
        &self,
        amount: Decimal,
        order_id: &str,
        customer: &CustomerDetails,
    ) -> Result<GatewayCheckout, PaymentError> {
        let gateway = self
            .inner
            .gateway
            .as_ref()
            .ok_or(PaymentError::GatewayUnavailable)?;

        let minor_units = (amount * Decimal::from(100)).trunc().to_string();

        let response = self
            .inner
            .client
            .post(&gateway.checkout_url)
            .basic_auth(&gateway.key_id, Some(gateway.key_secret.expose_secret()))
            .form(&[
                ("amount", minor_units.as_str()),
                ("currency", "INR"),
                ("reference", order_id),
                ("callback_url", self.inner.callback_url.as_str()),
                ("prefill[name]", customer.name.as_str()),
                ("prefill[email]", customer.email.as_str()),
                ("prefill[contact]", customer.phone.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let session: GatewaySessionResponse = response.json().await?;
        Ok(GatewayCheckout {
            id: session.id,
            url: session.url,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(gateway: Option<GatewayConfig>) -> PaymentsClient {
        PaymentsClient::new(
            &CatalogConfig {
                base_url: "http://127.0.0.1:5000".to_string(),
            },
            gateway,
            "http://localhost:3000/",
        )
    }

    #[test]
    fn test_gateway_availability() {
        assert!(!client(None).gateway_available());

        let gateway = GatewayConfig {
            key_id: "key".to_string(),
            key_secret: secrecy::SecretString::from("s3cr3t-value"),
            checkout_url: "https://checkout.gateway.test/v1/sessions".to_string(),
        };
        assert!(client(Some(gateway)).gateway_available());
    }

    #[tokio::test]
    async fn test_gateway_checkout_unavailable_without_config() {
        let result = client(None)
            .create_gateway_checkout(Decimal::from(100), "ORDER_1", &CustomerDetails::default())
            .await;

        assert!(matches!(result, Err(PaymentError::GatewayUnavailable)));
    }

    #[test]
    fn test_upi_response_wire_shape() {
        let json = r#"{"upiLink": "upi://pay?pa=store@upi&am=100", "qrData": "upi://pay?pa=store@upi&am=100"}"#;
        let parsed: UpiLinkResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.upi_link.starts_with("upi://"));
        assert_eq!(parsed.upi_link, parsed.qr_data);
    }
}
