//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers should
//! return `Result<T, AppError>`. Responses are JSON `{"error": "..."}`
//! bodies; errors that affect a user decision are always surfaced, never
//! silently logged.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::invoice::InvoiceError;
use crate::services::payments::PaymentError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog service operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout workflow operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Payment collaborator operation failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Invoice rendering failed.
    #[error("Invoice error: {0}")]
    Invoice(#[from] InvoiceError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(err) => match err {
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
                CatalogError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                CatalogError::Rejected { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_)
                | AuthError::EmptyUsername
                | AuthError::Rejected(_) => StatusCode::BAD_REQUEST,
                AuthError::Catalog(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(_)
                | CheckoutError::PaymentLinkMissing
                | CheckoutError::InvalidStep(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutError::IntegrationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                CheckoutError::PaymentLink(_)
                | CheckoutError::Gateway(_)
                | CheckoutError::Submission(_)
                | CheckoutError::SubmissionTimeout
                | CheckoutError::Catalog(_) => StatusCode::BAD_GATEWAY,
            },
            Self::Payment(err) => match err {
                PaymentError::GatewayUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Invoice(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// User-facing message; internal details are not leaked.
    fn message(&self) -> String {
        match self {
            Self::Session(_) => "Internal server error".to_string(),
            Self::Invoice(_) => "Failed to generate the invoice".to_string(),
            Self::Catalog(err) => match err {
                CatalogError::NotFound(msg) => msg.clone(),
                CatalogError::Rejected { message, .. } => message.clone(),
                CatalogError::RateLimited(secs) => {
                    format!("Too many requests, retry after {secs} seconds")
                }
                _ => "Catalog service error".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::Catalog(_) => "Account service error".to_string(),
                other => other.to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(field) => {
                    format!("Please fill out the required field: {field}")
                }
                CheckoutError::Submission(_) => {
                    "Order submission failed, your order was not placed".to_string()
                }
                CheckoutError::Catalog(_) => "Catalog service error".to_string(),
                other => other.to_string(),
            },
            Self::Payment(err) => match err {
                PaymentError::GatewayUnavailable => {
                    "Payment gateway is unavailable, please choose another payment method"
                        .to_string()
                }
                _ => "Payment service error".to_string(),
            },
            other => other.to_string(),
        }
    }

    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Session(_)
                | Self::Invoice(_)
                | Self::Catalog(_)
                | Self::Checkout(
                    CheckoutError::Submission(_)
                        | CheckoutError::SubmissionTimeout
                        | CheckoutError::Catalog(_)
                )
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.message() }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an email address.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_checkout_error_statuses() {
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::Validation(
                "pincode".to_string()
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::PaymentLinkMissing)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::IntegrationUnavailable)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::SubmissionTimeout)),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_submission_failure_is_not_reported_as_success() {
        let err = AppError::Checkout(CheckoutError::SubmissionTimeout);
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);

        let err = AppError::Checkout(CheckoutError::Submission(
            crate::catalog::CatalogError::NotFound("orders".to_string()),
        ));
        assert_eq!(
            err.message(),
            "Order submission failed, your order was not placed"
        );
    }
}
