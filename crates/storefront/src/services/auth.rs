//! Authentication service.
//!
//! Credentials are verified by the remote account service; this layer
//! validates input, maps service rejections onto auth errors, and shapes
//! the session identity.

use thiserror::Error;
use tracing::instrument;

use tech_gadgets_core::{Email, EmailError};

use crate::catalog::{CatalogClient, CatalogError};
use crate::models::CurrentUser;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Username missing.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The account service rejected the request with its own message.
    #[error("{0}")]
    Rejected(String),

    /// The account service could not be reached.
    #[error("account service error: {0}")]
    Catalog(CatalogError),
}

/// Authentication service.
///
/// Handles login and signup against the remote account service.
pub struct AuthService<'a> {
    catalog: &'a CatalogClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(catalog: &'a CatalogClient) -> Self {
        Self { catalog }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser, AuthError> {
        // Validate email format before going to the network
        let email = Email::parse(email)?;

        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .catalog
            .login(email.as_str(), password)
            .await
            .map_err(map_login_error)?;

        // The service's email is authoritative but should match what was sent
        let email = Email::parse(&user.email).unwrap_or(email);

        Ok(CurrentUser {
            email,
            username: user.username,
        })
    }

    /// Register a new account.
    ///
    /// Signup does not log the user in; the service's confirmation message
    /// is returned for display.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let email = Email::parse(email)?;

        if username.trim().is_empty() {
            return Err(AuthError::EmptyUsername);
        }

        validate_password(password)?;

        self.catalog
            .signup(username, email.as_str(), password)
            .await
            .map_err(map_signup_error)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Map a catalog rejection on login to an auth error.
fn map_login_error(err: CatalogError) -> AuthError {
    match err.rejection_status() {
        Some(401 | 404) => AuthError::InvalidCredentials,
        Some(_) => match err {
            CatalogError::Rejected { message, .. } => AuthError::Rejected(message),
            other => AuthError::Catalog(other),
        },
        None => AuthError::Catalog(err),
    }
}

/// Map a catalog rejection on signup to an auth error.
fn map_signup_error(err: CatalogError) -> AuthError {
    match err.rejection_status() {
        Some(409) => AuthError::UserAlreadyExists,
        Some(_) => match err {
            CatalogError::Rejected { message, .. } => AuthError::Rejected(message),
            other => AuthError::Catalog(other),
        },
        None => AuthError::Catalog(err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_too_short() {
        let result = validate_password("short");
        assert!(matches!(result, Err(AuthError::WeakPassword(_))));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("long-enough-password").is_ok());
    }

    #[test]
    fn test_map_login_error_unauthorized() {
        let err = map_login_error(CatalogError::Rejected {
            status: 401,
            message: "Invalid credentials".to_string(),
        });
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_map_login_error_passes_message_through() {
        let err = map_login_error(CatalogError::Rejected {
            status: 400,
            message: "Account locked".to_string(),
        });
        assert!(matches!(err, AuthError::Rejected(msg) if msg == "Account locked"));
    }

    #[test]
    fn test_map_signup_error_conflict() {
        let err = map_signup_error(CatalogError::Rejected {
            status: 409,
            message: "exists".to_string(),
        });
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }
}
