//! Authentication and account API handlers.
//!
//! This module provides HTTP REST endpoints for:
//! - User registration (which also logs the new user in)
//! - Login with username/password
//! - Password reset requests and completion
//! - Reading, updating and closing the caller's own account
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "player1", "password": "Pass1234", "email": "p1@example.com"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "player1", "password": "Pass1234"}'
//! ```

use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
};
use court_booking::auth::{
    Actor, LoginRequest, PasswordReset, PasswordResetConfirm, PasswordResetRequest,
    ProfileUpdate, RegisterRequest, User,
};
use serde::{Deserialize, Serialize};

use super::{
    AppState,
    errors::{ApiResult, auth_error},
};
use crate::{logging::log_security_event, metrics};

#[derive(Debug, Deserialize)]
pub struct DeleteAccountPayload {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: User,
}

/// Register a new user account and automatically log them in.
///
/// # Request Body
///
/// ```json
/// {
///   "username": "player123",
///   "password": "SecurePass123",
///   "email": "player@example.com",  // Optional
///   "phone": "+84 90 000 0000"      // Optional
/// }
/// ```
///
/// # Response
///
/// `201 Created` with an access token and the new user.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid username, email or weak password
/// - `409 Conflict`: Username or email already taken
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let login = LoginRequest {
        username: request.username.clone(),
        password: request.password.clone(),
    };

    state
        .auth_manager
        .register(request)
        .await
        .map_err(auth_error)?;
    let (user, token) = state.auth_manager.login(login).await.map_err(auth_error)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            user,
        }),
    ))
}

/// Authenticate a user and issue an access token.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
/// - `403 Forbidden`: Account deactivated
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let username = request.username.clone();

    match state.auth_manager.login(request).await {
        Ok((user, token)) => {
            metrics::login_attempts_total(true);
            Ok(Json(AuthResponse {
                access_token: token.access_token,
                token_type: token.token_type,
                expires_in: token.expires_in,
                user,
            }))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            log_security_event(
                "failed_login",
                None,
                &format!("Login failed for {username}: {e}"),
            );
            Err(auth_error(e))
        }
    }
}

/// File a password reset request for an administrator to approve.
///
/// # Response
///
/// `202 Accepted` with the pending request.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> ApiResult<(StatusCode, Json<PasswordReset>)> {
    let reset = state
        .auth_manager
        .request_password_reset(request)
        .await
        .map_err(auth_error)?;
    Ok((StatusCode::ACCEPTED, Json(reset)))
}

/// Set a new password using an approved reset request.
///
/// # Errors
///
/// - `400 Bad Request`: Request not yet approved, or weak password
/// - `404 Not Found`: No reset request for the user
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(confirm): Json<PasswordResetConfirm>,
) -> ApiResult<StatusCode> {
    state
        .auth_manager
        .complete_password_reset(confirm)
        .await
        .map_err(auth_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<User>> {
    let user = state
        .auth_manager
        .get_user(&actor.user_id)
        .await
        .map_err(auth_error)?;
    Ok(Json(user))
}

/// Update the current user's contact and personal details
pub async fn update_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    let user = state
        .auth_manager
        .update_profile(&actor, update)
        .await
        .map_err(auth_error)?;
    Ok(Json(user))
}

/// Close the current user's account after confirming their password.
///
/// The account is deactivated; its bookings and wallet history remain.
///
/// # Request Body
///
/// ```json
/// { "password": "SecurePass123" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Wrong password
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(payload): Json<DeleteAccountPayload>,
) -> ApiResult<StatusCode> {
    match state
        .auth_manager
        .delete_own_account(&actor, &payload.password)
        .await
    {
        Ok(_) => {
            log_security_event(
                "account_closed",
                Some(&actor.user_id),
                "User closed their account",
            );
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            log_security_event(
                "account_close_refused",
                Some(&actor.user_id),
                &format!("Account closure refused: {e}"),
            );
            Err(auth_error(e))
        }
    }
}
