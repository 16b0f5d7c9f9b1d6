//! Authentication error types.

use super::{access::AccessError, models::ResetId};
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Unknown username or wrong password
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Account has been deactivated
    #[error("User account is inactive")]
    UserInactive,

    /// Username already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// Email already exists
    #[error("Email already exists")]
    EmailTaken,

    /// Invalid username format
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Invalid email format
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Password reset request not found
    #[error("Password reset request not found: {0}")]
    ResetNotFound(ResetId),

    /// No approved password reset for this account
    #[error("Password reset has not been approved")]
    ResetNotApproved,

    /// Admins cannot deactivate themselves
    #[error("Cannot deactivate your own account")]
    CannotDeactivateSelf,

    /// Caller lacks the capability
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// JWT errors are sanitized to avoid exposing token structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            AuthError::HashingFailed => "Internal server error".to_string(),
            AuthError::ResetNotFound(_) => "Password reset request not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
