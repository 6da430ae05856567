//! Authentication route handlers.
//!
//! Login, signup, and logout against the remote account service. Login
//! also resumes a parked buy-now attempt: if the visitor hit "buy now"
//! while logged out, the payload is removed from the session and returned
//! so the client can re-enter checkout.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{BuyNowRedirect, CurrentUser, session_keys};
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Login response data.
#[derive(Debug, Serialize)]
pub struct LoginView {
    pub user: CurrentUser,
    pub message: String,
    /// A buy-now attempt parked before login, to resume now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_buy_now: Option<BuyNowRedirect>,
}

/// Simple message response.
#[derive(Debug, Serialize)]
pub struct MessageView {
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Login with email and password.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<LoginView>> {
    let service = AuthService::new(state.catalog());
    let user = service.login(&form.email, &form.password).await?;

    set_current_user(&session, &user).await?;
    set_sentry_user(user.email.as_str());

    // Hand back a parked buy-now attempt, removing it from the session
    let resume_buy_now = session
        .remove::<BuyNowRedirect>(session_keys::BUY_NOW_REDIRECT)
        .await?;

    tracing::info!(email = %user.email, "user logged in");

    Ok(Json(LoginView {
        user,
        message: "Login successful".to_string(),
        resume_buy_now,
    }))
}

/// Create a new account.
///
/// Signup does not log the user in; the service's message is returned for
/// display and the client proceeds to login.
#[instrument(skip(state, form))]
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<Json<MessageView>> {
    let service = AuthService::new(state.catalog());
    let message = service
        .signup(&form.username, &form.email, &form.password)
        .await?;

    Ok(Json(MessageView { message }))
}

/// Logout the current user.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<MessageView>> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(Json(MessageView {
        message: "Logged out".to_string(),
    }))
}
