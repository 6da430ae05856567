//! Payment method selection.

use serde::{Deserialize, Serialize};

/// Payment method chosen during checkout.
///
/// UPI requires a link-generation step before an order may be submitted;
/// the hosted gateway hands control to an external checkout page and
/// submits on its success callback. Card and cash-on-delivery need no
/// pre-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Upi,
    Gateway,
    CashOnDelivery,
}

impl PaymentMethod {
    /// Whether this method requires a payment link to be generated before
    /// the order can be submitted.
    #[must_use]
    pub const fn requires_payment_link(&self) -> bool {
        matches!(self, Self::Upi)
    }

    /// Whether this method hands control to an external checkout page.
    #[must_use]
    pub const fn requires_gateway_handoff(&self) -> bool {
        matches!(self, Self::Gateway)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreditCard => write!(f, "creditCard"),
            Self::Upi => write!(f, "upi"),
            Self::Gateway => write!(f, "gateway"),
            Self::CashOnDelivery => write!(f, "cashOnDelivery"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creditCard" => Ok(Self::CreditCard),
            "upi" => Ok(Self::Upi),
            "gateway" => Ok(Self::Gateway),
            "cashOnDelivery" => Ok(Self::CashOnDelivery),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap();
        assert_eq!(json, "\"cashOnDelivery\"");

        let parsed: PaymentMethod = serde_json::from_str("\"upi\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Upi);
    }

    #[test]
    fn test_pre_step_requirements() {
        assert!(PaymentMethod::Upi.requires_payment_link());
        assert!(!PaymentMethod::CreditCard.requires_payment_link());
        assert!(PaymentMethod::Gateway.requires_gateway_handoff());
        assert!(!PaymentMethod::CashOnDelivery.requires_gateway_handoff());
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for method in [
            PaymentMethod::CreditCard,
            PaymentMethod::Upi,
            PaymentMethod::Gateway,
            PaymentMethod::CashOnDelivery,
        ] {
            let parsed: PaymentMethod = method.to_string().parse().unwrap();
            assert_eq!(parsed, method);
        }
    }
}
