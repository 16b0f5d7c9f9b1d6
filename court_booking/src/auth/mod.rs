//! Accounts, credentials and capability checks.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - JWT access tokens (15-minute expiry by default)
//! - Roles and a single capability check in front of admin operations
//! - Admin user management and an approval-based password reset
//!
//! ## Example
//!
//! ```
//! use court_booking::auth::{AuthManager, LoginRequest, RegisterRequest};
//! use court_booking::db::Database;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let auth = AuthManager::new(
//!     Database::new(),
//!     "secret_pepper".to_string(),
//!     "jwt_secret_that_is_at_least_32_chars".to_string(),
//! );
//!
//! let user = auth
//!     .register(RegisterRequest {
//!         username: "player1".to_string(),
//!         password: "SecurePass123".to_string(),
//!         email: Some("player@example.com".to_string()),
//!         phone: None,
//!     })
//!     .await?;
//!
//! let (_, token) = auth
//!     .login(LoginRequest {
//!         username: "player1".to_string(),
//!         password: "SecurePass123".to_string(),
//!     })
//!     .await?;
//! assert_eq!(auth.authenticate(&token.access_token).await?.user_id, user.id);
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod accounts;
pub mod errors;
pub mod manager;
pub mod models;

pub use access::{AccessError, AccessPolicy, Actor, Capability};
pub use accounts::Accounts;
pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{
    AccessTokenClaims, LoginRequest, PasswordReset, PasswordResetConfirm, PasswordResetRequest,
    ProfileUpdate, RegisterRequest, ResetId, Role, SessionToken, User, UserId, UserRecord,
    UserUpdate,
};
