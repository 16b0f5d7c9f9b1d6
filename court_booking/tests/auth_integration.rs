//! Integration tests for authentication system.
//!
//! Tests registration, login, token validation, role changes and account
//! deactivation against a shared in-process store.

use court_booking::auth::{
    AccessError, Actor, AuthError, AuthManager, LoginRequest, RegisterRequest, Role, UserUpdate,
};
use court_booking::db::Database;
use court_booking::wallet::{SimulatedGateway, TopUpLimits, WalletManager};
use std::sync::Arc;

/// Helper to create an auth manager on a fresh store
fn setup_auth_manager() -> AuthManager {
    AuthManager::new(
        Database::new(),
        "test_pepper_for_integration".to_string(),
        "test_jwt_secret_for_integration_tests".to_string(),
    )
}

fn signup(username: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        password: "SecurePass123".to_string(),
        email: Some(format!("{username}@example.com")),
        phone: None,
    }
}

fn credentials(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_new_user() {
    let auth = setup_auth_manager();

    let user = auth
        .register(signup("newplayer"))
        .await
        .expect("Registration should succeed");

    assert_eq!(user.username, "newplayer");
    assert_eq!(user.email.as_deref(), Some("newplayer@example.com"));
    assert_eq!(user.role, Role::User);
    assert!(user.is_active);
    assert!(user.last_login.is_none());
    assert!(user.id.starts_with('U'));
    assert_eq!(user.id.len(), 9);
}

#[tokio::test]
async fn test_admin_ids_use_admin_prefix() {
    let auth = setup_auth_manager();

    let admin = auth.create_admin("head_admin", "AdminPass123").await.unwrap();

    assert_eq!(admin.role, Role::Admin);
    assert!(admin.id.starts_with("ADMIN"));
    assert_eq!(admin.id.len(), 11);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let auth = setup_auth_manager();

    auth.register(signup("duplicate")).await.unwrap();

    let mut again = signup("Duplicate");
    again.email = None;
    let result = auth.register(again).await;
    assert!(matches!(result, Err(AuthError::UsernameTaken)));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let auth = setup_auth_manager();

    auth.register(signup("first_owner")).await.unwrap();

    let mut other = signup("second_owner");
    other.email = Some("FIRST_OWNER@example.com".to_string());
    let result = auth.register(other).await;
    assert!(matches!(result, Err(AuthError::EmailTaken)));
}

#[tokio::test]
async fn test_register_weak_password() {
    let auth = setup_auth_manager();

    let mut request = signup("weakpass");
    request.password = "short".to_string();

    let result = auth.register(request).await;
    assert!(matches!(result, Err(AuthError::WeakPassword(_))));
}

#[tokio::test]
async fn test_login_success() {
    let auth = setup_auth_manager();
    auth.register(signup("loginuser")).await.unwrap();

    let (user, token) = auth
        .login(credentials("loginuser", "SecurePass123"))
        .await
        .expect("Login should succeed");

    assert_eq!(user.username, "loginuser");
    assert!(user.last_login.is_some());
    assert_eq!(token.token_type, "Bearer");
    assert!(!token.access_token.is_empty());

    let actor = auth.authenticate(&token.access_token).await.unwrap();
    assert_eq!(actor, Actor::from(&user));
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_username() {
    let auth = setup_auth_manager();
    auth.register(signup("MixedCase")).await.unwrap();

    let (user, _) = auth
        .login(credentials("mixedcase", "SecurePass123"))
        .await
        .unwrap();
    assert_eq!(user.username, "MixedCase");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let auth = setup_auth_manager();
    auth.register(signup("wrongpass")).await.unwrap();

    let result = auth.login(credentials("wrongpass", "WrongPassword")).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let auth = setup_auth_manager();

    let result = auth.login(credentials("nobody_here", "SecurePass123")).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_concurrent_registrations() {
    let auth = Arc::new(setup_auth_manager());

    let mut handles = Vec::new();
    for _ in 0..5 {
        let auth = auth.clone();
        handles.push(tokio::spawn(async move {
            let mut request = signup("racer");
            request.email = None;
            auth.register(request).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(e) => assert!(matches!(e, AuthError::UsernameTaken)),
        }
    }

    // Exactly one registration should succeed
    assert_eq!(created, 1);
}

#[tokio::test]
async fn test_multiple_sessions_same_user() {
    let auth = setup_auth_manager();
    auth.register(signup("multisession")).await.unwrap();

    let (_, first) = auth
        .login(credentials("multisession", "SecurePass123"))
        .await
        .unwrap();
    let (_, second) = auth
        .login(credentials("multisession", "SecurePass123"))
        .await
        .unwrap();

    // Both tokens stay valid
    assert!(auth.authenticate(&first.access_token).await.is_ok());
    assert!(auth.authenticate(&second.access_token).await.is_ok());
}

#[tokio::test]
async fn test_invalid_token() {
    let auth = setup_auth_manager();

    let result = auth.authenticate("invalid_token_string").await;
    assert!(matches!(result, Err(AuthError::JwtError(_))));
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let db = Database::new();
    let issuer = AuthManager::new(
        db.clone(),
        "shared_pepper_value".to_string(),
        "issuer_secret_that_is_long_enough_32".to_string(),
    );
    let verifier = AuthManager::new(
        db,
        "shared_pepper_value".to_string(),
        "another_secret_that_is_long_enough_32".to_string(),
    );
    issuer.register(signup("forged")).await.unwrap();
    let (_, token) = issuer
        .login(credentials("forged", "SecurePass123"))
        .await
        .unwrap();

    let result = verifier.authenticate(&token.access_token).await;
    assert!(matches!(result, Err(AuthError::JwtError(_))));
}

#[tokio::test]
async fn test_role_change_applies_to_existing_token() {
    let auth = setup_auth_manager();
    let admin = Actor::from(&auth.create_admin("root_admin", "AdminPass123").await.unwrap());
    let user = auth.register(signup("promoted")).await.unwrap();
    let (_, token) = auth
        .login(credentials("promoted", "SecurePass123"))
        .await
        .unwrap();

    auth.update_user(
        &admin,
        &user.id,
        UserUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let actor = auth.authenticate(&token.access_token).await.unwrap();
    assert_eq!(actor.role, Role::Admin);
}

#[tokio::test]
async fn test_deactivation_revokes_access_but_keeps_wallet() {
    let db = Database::new();
    let auth = AuthManager::new(
        db.clone(),
        "test_pepper_for_integration".to_string(),
        "test_jwt_secret_for_integration_tests".to_string(),
    );
    let wallets = WalletManager::new(db, Arc::new(SimulatedGateway), TopUpLimits::default());
    let admin = Actor::from(&auth.create_admin("root_admin", "AdminPass123").await.unwrap());
    let user = auth.register(signup("leaving")).await.unwrap();
    let (_, token) = auth
        .login(credentials("leaving", "SecurePass123"))
        .await
        .unwrap();

    let deactivated = auth.deactivate_user(&admin, &user.id).await.unwrap();
    assert!(!deactivated.is_active);

    assert!(matches!(
        auth.authenticate(&token.access_token).await,
        Err(AuthError::UserInactive)
    ));
    assert!(matches!(
        auth.login(credentials("leaving", "SecurePass123")).await,
        Err(AuthError::UserInactive)
    ));
    assert!(wallets.get_wallet(&user.id).await.is_ok());
}

#[tokio::test]
async fn test_regular_user_cannot_manage_accounts() {
    let auth = setup_auth_manager();
    let user = Actor::from(&auth.register(signup("ordinary")).await.unwrap());
    let other = auth.register(signup("target")).await.unwrap();

    assert!(matches!(
        auth.list_users(&user).await,
        Err(AuthError::Access(AccessError::Forbidden(_)))
    ));
    assert!(matches!(
        auth.deactivate_user(&user, &other.id).await,
        Err(AuthError::Access(_))
    ));
}

#[tokio::test]
async fn test_delete_own_account_requires_password() {
    let auth = setup_auth_manager();
    let user = auth.register(signup("closing")).await.unwrap();
    let actor = Actor::from(&user);

    assert!(matches!(
        auth.delete_own_account(&actor, "NotMyPassword").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(auth.get_user(&user.id).await.unwrap().is_active);
    assert!(auth.login(credentials("closing", "SecurePass123")).await.is_ok());

    let closed = auth
        .delete_own_account(&actor, "SecurePass123")
        .await
        .unwrap();
    assert!(!closed.is_active);
    assert!(matches!(
        auth.login(credentials("closing", "SecurePass123")).await,
        Err(AuthError::UserInactive)
    ));
}
