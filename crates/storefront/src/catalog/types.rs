//! Domain types for the remote catalog & account service.
//!
//! Wire shapes are collaborator-defined: most endpoints use lowercase or
//! camelCase JSON keys, while order history records use snake_case. The
//! serde attributes below pin each type to the shape its endpoint speaks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tech_gadgets_core::{AddressId, PaymentMethod, ProductId};

// =============================================================================
// Catalog Types
// =============================================================================

/// A product in the remote catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Catalog-assigned product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Image filename, resolvable via the base64 image lookup.
    pub image_url: String,
    /// Available stock quantity.
    pub quantity: i64,
}

impl Product {
    /// Whether the product can currently be purchased.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Snapshot of the product fields a cart line needs.
///
/// Cart lines carry a snapshot rather than a product reference so that the
/// total computed at checkout entry is immune to later catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
        }
    }
}

/// A single cart line: product snapshot plus quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductSummary,
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// A customer review attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub product_id: ProductId,
    pub text: String,
    pub date: DateTime<Utc>,
}

// =============================================================================
// Address Types
// =============================================================================

/// A saved delivery address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    /// Server-assigned ID, present once the address has been saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    pub name: String,
    pub address: String,
    pub city: String,
    pub pincode: String,
    pub phone: String,
    pub email: String,
}

/// Fields submitted when saving a new address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
    pub name: String,
    pub address: String,
    pub city: String,
    pub email: String,
    pub pincode: String,
    pub phone: String,
}

/// Response wrapper for the address list endpoint.
///
/// The service returns a single object when one address is saved and an
/// array otherwise; `OneOrMany` normalizes both into a list.
#[derive(Debug, Deserialize)]
pub struct AddressListResponse {
    pub success: bool,
    #[serde(default)]
    pub address: Option<OneOrMany<Address>>,
}

/// Response wrapper for the save-address endpoint.
#[derive(Debug, Deserialize)]
pub struct SaveAddressResponse {
    pub success: bool,
    pub address: Address,
}

/// One value or a list of values, flattened into a `Vec` on access.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Normalize into a `Vec`.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// Customer details attached to an order: the selected delivery address
/// plus contact fields. All six fields are required before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub address: String,
    pub city: String,
    pub email: String,
    pub pincode: String,
    pub phone: String,
}

impl CustomerDetails {
    /// Returns the name of the first empty required field, if any.
    #[must_use]
    pub fn first_missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
            ("email", &self.email),
            ("pincode", &self.pincode),
            ("phone", &self.phone),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

impl From<&Address> for CustomerDetails {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            address: address.address.clone(),
            city: address.city.clone(),
            email: address.email.clone(),
            pincode: address.pincode.clone(),
            phone: address.phone.clone(),
        }
    }
}

/// Payload for the order submission endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub items: Vec<CartItem>,
    pub user_details: CustomerDetails,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
}

/// Identifiers returned by the catalog service after order submission.
///
/// These are authoritative and take precedence over any client-generated
/// provisional identifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    #[serde(default, deserialize_with = "string_or_number")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub tracking_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub transaction_id: Option<String>,
}

/// Accept identifiers serialized as either JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A historical order record, as returned by the order history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub total_amount: Decimal,
    pub payment_method: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub address: String,
    pub city: String,
}

// =============================================================================
// Account Types
// =============================================================================

/// The authenticated user as returned by the account service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub email: String,
    pub username: String,
}

/// Response wrapper for the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: AuthUser,
}

/// Response wrapper for the signup endpoint.
#[derive(Debug, Deserialize)]
pub struct SignupResponse {
    pub message: String,
}

/// Response wrapper for the base64 image lookup.
#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    /// Image content as a data URL.
    pub image: String,
}

/// Error body returned by the service on rejected requests.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let item = CartItem {
            product: ProductSummary {
                id: ProductId::new(1),
                name: "Widget".to_string(),
                price: Decimal::from(500),
                image_url: "widget.jpg".to_string(),
            },
            quantity: 3,
        };
        assert_eq!(item.line_total(), Decimal::from(1500));
    }

    #[test]
    fn test_one_or_many_normalizes() {
        let one: OneOrMany<i32> = serde_json::from_str("1").unwrap();
        assert_eq!(one.into_vec(), vec![1]);

        let many: OneOrMany<i32> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(many.into_vec(), vec![1, 2]);
    }

    #[test]
    fn test_first_missing_field() {
        let mut details = CustomerDetails {
            name: "Asha".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            email: "asha@example.com".to_string(),
            pincode: "560001".to_string(),
            phone: "9876543210".to_string(),
        };
        assert_eq!(details.first_missing_field(), None);

        details.pincode = "  ".to_string();
        assert_eq!(details.first_missing_field(), Some("pincode"));
    }

    #[test]
    fn test_customer_details_preserve_address_fields() {
        let address = Address {
            id: Some(AddressId::new(9)),
            name: "Asha".to_string(),
            address: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            pincode: "560001".to_string(),
            phone: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
        };

        let details = CustomerDetails::from(&address);
        assert_eq!(details.name, address.name);
        assert_eq!(details.address, address.address);
        assert_eq!(details.city, address.city);
        assert_eq!(details.pincode, address.pincode);
        assert_eq!(details.phone, address.phone);
        assert_eq!(details.email, address.email);
    }

    #[test]
    fn test_order_submission_wire_shape() {
        let submission = OrderSubmission {
            items: vec![],
            user_details: CustomerDetails::default(),
            total: Decimal::from(100),
            payment_method: PaymentMethod::CashOnDelivery,
            transaction_id: None,
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert!(json.get("userDetails").is_some());
        assert_eq!(json["paymentMethod"], "cashOnDelivery");
        assert!(json["transactionId"].is_null());
    }

    #[test]
    fn test_order_confirmation_tolerates_missing_fields() {
        let confirmation: OrderConfirmation = serde_json::from_str("{}").unwrap();
        assert!(confirmation.order_id.is_none());

        let confirmation: OrderConfirmation =
            serde_json::from_str(r#"{"orderId": "42", "trackingId": "TRK_1"}"#).unwrap();
        assert_eq!(confirmation.order_id.as_deref(), Some("42"));
        assert_eq!(confirmation.tracking_id.as_deref(), Some("TRK_1"));
        assert!(confirmation.transaction_id.is_none());
    }

    #[test]
    fn test_order_confirmation_accepts_numeric_ids() {
        let confirmation: OrderConfirmation =
            serde_json::from_str(r#"{"orderId": 42, "transactionId": null}"#).unwrap();
        assert_eq!(confirmation.order_id.as_deref(), Some("42"));
        assert!(confirmation.transaction_id.is_none());
    }
}
