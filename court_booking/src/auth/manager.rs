//! Authentication manager implementation.

use super::{
    access::{AccessPolicy, Actor, Capability},
    errors::{AuthError, AuthResult},
    models::{
        AccessTokenClaims, LoginRequest, PasswordReset, PasswordResetConfirm,
        PasswordResetRequest, ProfileUpdate, RegisterRequest, ResetId, Role, SessionToken, User,
        UserId, UserRecord, UserUpdate,
    },
};
use crate::db::Database;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{info, warn};

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    db: Database,
    pepper: String,
    jwt_secret: String,
    access_token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `db` - Shared store
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    ///
    /// # Returns
    ///
    /// * `AuthManager` - New authentication manager instance
    pub fn new(db: Database, pepper: String, jwt_secret: String) -> Self {
        Self {
            db,
            pepper,
            jwt_secret,
            access_token_duration: Duration::minutes(15), // 15 minutes
        }
    }

    /// Override the access token lifetime
    pub fn with_access_token_duration(mut self, duration: Duration) -> Self {
        self.access_token_duration = duration;
        self
    }

    /// Register a new user and open their wallet
    ///
    /// # Arguments
    ///
    /// * `request` - Registration request with username, password, etc.
    ///
    /// # Returns
    ///
    /// * `AuthResult<User>` - Created user or error
    ///
    /// # Errors
    ///
    /// * `AuthError::UsernameTaken` - Username already exists
    /// * `AuthError::EmailTaken` - Email already exists
    /// * `AuthError::InvalidUsername` - Username format invalid
    /// * `AuthError::WeakPassword` - Password too short
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<User> {
        self.create_account(request, Role::User).await
    }

    /// Create an administrator account
    pub async fn create_admin(&self, username: &str, password: &str) -> AuthResult<User> {
        let request = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: None,
            phone: None,
        };
        self.create_account(request, Role::Admin).await
    }

    async fn create_account(&self, request: RegisterRequest, role: Role) -> AuthResult<User> {
        validate_username(&request.username)?;
        validate_password(&request.password)?;
        if let Some(email) = &request.email {
            validate_email(email)?;
        }

        // Hash outside the lock
        let password_hash = self.hash_password(&request.password)?;
        let now = Utc::now();

        let mut tables = self.db.write().await;
        let id = tables.accounts.next_user_id(role);
        let record = UserRecord {
            user: User {
                id,
                username: request.username,
                email: request.email,
                phone: request.phone,
                address: None,
                gender: None,
                date_of_birth: None,
                role,
                is_active: true,
                created_at: now,
                last_login: None,
            },
            password_hash,
        };
        let user = tables.accounts.insert(record)?.clone();
        tables.ledger.open_wallet(&user.id, now);

        info!("Registered {} {} ({})", user.role, user.username, user.id);
        Ok(user)
    }

    /// Login a user
    ///
    /// # Arguments
    ///
    /// * `request` - Login request with username and password
    ///
    /// # Returns
    ///
    /// * `AuthResult<(User, SessionToken)>` - User and access token or error
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown user or incorrect password
    /// * `AuthError::UserInactive` - Account has been deactivated
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionToken)> {
        let (user_id, password_hash, is_active) = {
            let tables = self.db.read().await;
            let record = tables
                .accounts
                .find_by_username(&request.username)
                .ok_or(AuthError::InvalidCredentials)?;
            (
                record.user.id.clone(),
                record.password_hash.clone(),
                record.user.is_active,
            )
        };

        self.verify_password(&request.password, &password_hash)?;
        if !is_active {
            return Err(AuthError::UserInactive);
        }

        let user = {
            let mut tables = self.db.write().await;
            let record = tables.accounts.get_mut(&user_id)?;
            record.user.last_login = Some(Utc::now());
            record.user.clone()
        };

        let token = self.generate_access_token(&user)?;
        info!("User {} logged in", user.id);
        Ok((user, token))
    }

    /// Verify an access token
    ///
    /// # Arguments
    ///
    /// * `token` - JWT access token
    ///
    /// # Returns
    ///
    /// * `AuthResult<AccessTokenClaims>` - Decoded claims or error
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Resolve a token into the caller, using the account's current role
    ///
    /// # Errors
    ///
    /// * `AuthError::JwtError` - Token invalid or expired
    /// * `AuthError::UserNotFound` - Account no longer exists
    /// * `AuthError::UserInactive` - Account has been deactivated
    pub async fn authenticate(&self, token: &str) -> AuthResult<Actor> {
        let claims = self.verify_access_token(token)?;
        let tables = self.db.read().await;
        let user = tables
            .accounts
            .user(&claims.sub)
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active {
            return Err(AuthError::UserInactive);
        }
        Ok(Actor::from(user))
    }

    pub async fn get_user(&self, user_id: &UserId) -> AuthResult<User> {
        let tables = self.db.read().await;
        tables
            .accounts
            .user(user_id)
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }

    /// Update the caller's own profile
    pub async fn update_profile(&self, actor: &Actor, update: ProfileUpdate) -> AuthResult<User> {
        if let Some(email) = &update.email {
            validate_email(email)?;
        }

        let mut tables = self.db.write().await;
        if let Some(email) = &update.email {
            tables
                .accounts
                .ensure_email_free(email, Some(&actor.user_id))?;
        }

        let user = &mut tables.accounts.get_mut(&actor.user_id)?.user;
        if let Some(email) = update.email {
            user.email = Some(email);
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(address) = update.address {
            user.address = Some(address);
        }
        if let Some(gender) = update.gender {
            user.gender = Some(gender);
        }
        if let Some(date_of_birth) = update.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }

        info!("User {} updated their profile", actor.user_id);
        Ok(user.clone())
    }

    /// Every account, in join order
    pub async fn list_users(&self, actor: &Actor) -> AuthResult<Vec<User>> {
        AccessPolicy::require(actor, Capability::ManageUsers)?;
        let tables = self.db.read().await;
        Ok(tables.accounts.users().into_iter().cloned().collect())
    }

    /// Edit any account
    ///
    /// # Errors
    ///
    /// * `AuthError::Access` - Actor cannot manage users
    /// * `AuthError::UsernameTaken` / `EmailTaken` - New value already in use
    pub async fn update_user(
        &self,
        actor: &Actor,
        user_id: &UserId,
        update: UserUpdate,
    ) -> AuthResult<User> {
        AccessPolicy::require(actor, Capability::ManageUsers)?;
        if let Some(username) = &update.username {
            validate_username(username)?;
        }
        if let Some(email) = &update.email {
            validate_email(email)?;
        }
        if update.is_active == Some(false) && &actor.user_id == user_id {
            return Err(AuthError::CannotDeactivateSelf);
        }

        let mut tables = self.db.write().await;
        tables
            .accounts
            .user(user_id)
            .ok_or(AuthError::UserNotFound)?;
        if let Some(email) = &update.email {
            tables.accounts.ensure_email_free(email, Some(user_id))?;
        }
        if let Some(username) = &update.username {
            tables.accounts.rename(user_id, username)?;
        }

        let user = &mut tables.accounts.get_mut(user_id)?.user;
        if let Some(email) = update.email {
            user.email = Some(email);
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }

        info!("User {user_id} updated by {}", actor.user_id);
        Ok(user.clone())
    }

    /// Soft-delete an account; its bookings and ledger history stay intact
    pub async fn deactivate_user(&self, actor: &Actor, user_id: &UserId) -> AuthResult<User> {
        AccessPolicy::require(actor, Capability::ManageUsers)?;
        if &actor.user_id == user_id {
            return Err(AuthError::CannotDeactivateSelf);
        }

        let mut tables = self.db.write().await;
        let user = &mut tables.accounts.get_mut(user_id)?.user;
        user.is_active = false;

        info!("User {user_id} deactivated by {}", actor.user_id);
        Ok(user.clone())
    }

    /// Close the caller's own account after re-checking their password
    ///
    /// The account is deactivated, not removed, so bookings and ledger
    /// history keep their owner.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Password does not match
    /// * `AuthError::UserNotFound` - Account no longer exists
    pub async fn delete_own_account(&self, actor: &Actor, password: &str) -> AuthResult<User> {
        let password_hash = {
            let tables = self.db.read().await;
            tables
                .accounts
                .get(&actor.user_id)
                .map(|record| record.password_hash.clone())
                .ok_or(AuthError::UserNotFound)?
        };

        if let Err(e) = self.verify_password(password, &password_hash) {
            warn!("Account deletion for {} refused: wrong password", actor.user_id);
            return Err(e);
        }

        let mut tables = self.db.write().await;
        let user = &mut tables.accounts.get_mut(&actor.user_id)?.user;
        user.is_active = false;

        info!("User {} closed their account", actor.user_id);
        Ok(user.clone())
    }

    /// File a password reset request for an account
    pub async fn request_password_reset(
        &self,
        request: PasswordResetRequest,
    ) -> AuthResult<PasswordReset> {
        let now = Utc::now();
        let mut tables = self.db.write().await;
        let user_id = tables
            .accounts
            .find_by_username(&request.username)
            .map(|record| record.user.id.clone())
            .ok_or(AuthError::UserNotFound)?;

        let reset = tables.accounts.file_reset(&user_id, now).clone();
        info!("Password reset {} requested for {user_id}", reset.id);
        Ok(reset)
    }

    pub async fn list_password_resets(&self, actor: &Actor) -> AuthResult<Vec<PasswordReset>> {
        AccessPolicy::require(actor, Capability::ApprovePasswordResets)?;
        let tables = self.db.read().await;
        Ok(tables.accounts.resets().cloned().collect())
    }

    pub async fn approve_password_reset(
        &self,
        actor: &Actor,
        reset_id: ResetId,
    ) -> AuthResult<PasswordReset> {
        AccessPolicy::require(actor, Capability::ApprovePasswordResets)?;
        let mut tables = self.db.write().await;
        let reset = tables.accounts.approve_reset(reset_id)?.clone();

        info!("Password reset {reset_id} approved by {}", actor.user_id);
        Ok(reset)
    }

    /// Set a new password, consuming the approved reset request
    ///
    /// # Errors
    ///
    /// * `AuthError::ResetNotApproved` - No approved request for this account
    /// * `AuthError::WeakPassword` - New password too short
    pub async fn complete_password_reset(&self, confirm: PasswordResetConfirm) -> AuthResult<()> {
        validate_password(&confirm.new_password)?;
        let password_hash = self.hash_password(&confirm.new_password)?;

        let mut tables = self.db.write().await;
        let user_id = tables
            .accounts
            .find_by_username(&confirm.username)
            .map(|record| record.user.id.clone())
            .ok_or(AuthError::UserNotFound)?;
        let reset_id = tables
            .accounts
            .approved_reset(&user_id)
            .ok_or(AuthError::ResetNotApproved)?;

        tables.accounts.consume_reset(reset_id)?;
        tables.accounts.get_mut(&user_id)?.password_hash = password_hash;

        warn!("Password for {user_id} reset through request {reset_id}");
        Ok(())
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Generate JWT access token
    fn generate_access_token(&self, user: &User) -> AuthResult<SessionToken> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            exp: (now + self.access_token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(SessionToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_duration.num_seconds(),
        })
    }
}

/// Validate username format
fn validate_username(username: &str) -> AuthResult<()> {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return Err(AuthError::InvalidUsername(
            "Username must be 3-20 characters".to_string(),
        ));
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(AuthError::InvalidUsername(
            "Username can only contain letters, numbers, and underscores".to_string(),
        ));
    }

    Ok(())
}

/// Validate password strength
fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < 8 {
        return Err(AuthError::WeakPassword(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> AuthResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AuthError::InvalidEmail(email.to_string())),
    }
}
