//! Accounts table and password reset requests.

use super::{
    errors::{AuthError, AuthResult},
    models::{PasswordReset, ResetId, Role, User, UserId, UserRecord},
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Registered accounts keyed by id, with a username index
#[derive(Debug, Default)]
pub struct Accounts {
    users: HashMap<UserId, UserRecord>,
    by_username: HashMap<String, UserId>,
    resets: BTreeMap<ResetId, PasswordReset>,
    last_reset_id: ResetId,
}

impl Accounts {
    /// Draw an unused id for a new account of `role`
    pub fn next_user_id(&self, role: Role) -> UserId {
        let (prefix, digits) = match role {
            Role::User => ("U", 8),
            Role::Admin => ("ADMIN", 6),
        };
        loop {
            let hex = Uuid::new_v4().simple().to_string();
            let id = format!("{prefix}{}", hex[..digits].to_uppercase());
            if !self.users.contains_key(&id) {
                return id;
            }
        }
    }

    /// Add an account; username and email must be unused
    pub fn insert(&mut self, record: UserRecord) -> AuthResult<&User> {
        self.ensure_username_free(&record.user.username)?;
        if let Some(email) = &record.user.email {
            self.ensure_email_free(email, None)?;
        }

        let id = record.user.id.clone();
        self.by_username
            .insert(record.user.username.to_lowercase(), id.clone());
        let record = self.users.entry(id).or_insert(record);
        Ok(&record.user)
    }

    pub fn get(&self, user_id: &UserId) -> Option<&UserRecord> {
        self.users.get(user_id)
    }

    pub fn get_mut(&mut self, user_id: &UserId) -> AuthResult<&mut UserRecord> {
        self.users.get_mut(user_id).ok_or(AuthError::UserNotFound)
    }

    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.get(user_id).map(|record| &record.user)
    }

    /// Case-insensitive username lookup
    pub fn find_by_username(&self, username: &str) -> Option<&UserRecord> {
        self.by_username
            .get(&username.to_lowercase())
            .and_then(|id| self.users.get(id))
    }

    pub fn ensure_username_free(&self, username: &str) -> AuthResult<()> {
        if self.by_username.contains_key(&username.to_lowercase()) {
            return Err(AuthError::UsernameTaken);
        }
        Ok(())
    }

    /// Fail if another account than `owner` already uses `email`
    pub fn ensure_email_free(&self, email: &str, owner: Option<&UserId>) -> AuthResult<()> {
        let taken = self.users.values().any(|record| {
            Some(&record.user.id) != owner
                && record
                    .user
                    .email
                    .as_deref()
                    .is_some_and(|existing| existing.eq_ignore_ascii_case(email))
        });
        if taken {
            return Err(AuthError::EmailTaken);
        }
        Ok(())
    }

    /// Change a username, keeping the index in step
    pub fn rename(&mut self, user_id: &UserId, username: &str) -> AuthResult<()> {
        let current = self
            .user(user_id)
            .ok_or(AuthError::UserNotFound)?
            .username
            .clone();
        if current.eq_ignore_ascii_case(username) {
            self.get_mut(user_id)?.user.username = username.to_string();
            return Ok(());
        }
        self.ensure_username_free(username)?;

        self.by_username.remove(&current.to_lowercase());
        self.by_username
            .insert(username.to_lowercase(), user_id.clone());
        self.get_mut(user_id)?.user.username = username.to_string();
        Ok(())
    }

    /// Users in join order
    pub fn users(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().map(|record| &record.user).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    pub fn count_by_role(&self, role: Role) -> usize {
        self.users
            .values()
            .filter(|record| record.user.role == role)
            .count()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// File a reset request, or return the one already waiting
    pub fn file_reset(&mut self, user_id: &UserId, now: DateTime<Utc>) -> &PasswordReset {
        let existing = self
            .resets
            .values()
            .find(|reset| &reset.user_id == user_id)
            .map(|reset| reset.id);
        let id = match existing {
            Some(id) => id,
            None => {
                self.last_reset_id += 1;
                self.last_reset_id
            }
        };
        self.resets.entry(id).or_insert_with(|| PasswordReset {
            id,
            user_id: user_id.clone(),
            requested_at: now,
            approved: false,
        })
    }

    pub fn resets(&self) -> impl Iterator<Item = &PasswordReset> {
        self.resets.values()
    }

    pub fn approve_reset(&mut self, reset_id: ResetId) -> AuthResult<&PasswordReset> {
        let reset = self
            .resets
            .get_mut(&reset_id)
            .ok_or(AuthError::ResetNotFound(reset_id))?;
        reset.approved = true;
        Ok(reset)
    }

    /// The approved reset for `user_id`, if any, without consuming it
    pub fn approved_reset(&self, user_id: &UserId) -> Option<ResetId> {
        self.resets
            .values()
            .find(|reset| &reset.user_id == user_id && reset.approved)
            .map(|reset| reset.id)
    }

    pub fn consume_reset(&mut self, reset_id: ResetId) -> AuthResult<PasswordReset> {
        self.resets
            .remove(&reset_id)
            .ok_or(AuthError::ResetNotFound(reset_id))
    }
}
