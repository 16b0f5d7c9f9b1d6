//! Capability checks for admin-only operations.

use super::models::{Role, User, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    ManageCourts,
    ManageUsers,
    ModerateReports,
    ManageAllBookings,
    ViewRevenue,
    ViewAnalytics,
    ApprovePasswordResets,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::ManageCourts => "manage courts",
            Capability::ManageUsers => "manage users",
            Capability::ModerateReports => "moderate reports",
            Capability::ManageAllBookings => "manage all bookings",
            Capability::ViewRevenue => "view revenue",
            Capability::ViewAnalytics => "view analytics",
            Capability::ApprovePasswordResets => "approve password resets",
        };
        write!(f, "{name}")
    }
}

impl Role {
    /// Whether this role holds `capability`
    pub fn allows(self, capability: Capability) -> bool {
        match (self, capability) {
            (Role::Admin, _) => true,
            (Role::User, _) => false,
        }
    }
}

/// The authenticated caller of an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            role: user.role,
        }
    }
}

/// Capability check failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Forbidden: requires permission to {0}")]
    Forbidden(Capability),
}

/// Single gate in front of every admin-only operation
pub struct AccessPolicy;

impl AccessPolicy {
    /// Fail unless `actor` holds `capability`
    ///
    /// # Examples
    ///
    /// ```
    /// use court_booking::auth::{AccessPolicy, Actor, Capability, Role};
    ///
    /// let admin = Actor { user_id: "ADMIN0A1B2C".to_string(), role: Role::Admin };
    /// let player = Actor { user_id: "U0A1B2C3D".to_string(), role: Role::User };
    ///
    /// assert!(AccessPolicy::require(&admin, Capability::ViewRevenue).is_ok());
    /// assert!(AccessPolicy::require(&player, Capability::ViewRevenue).is_err());
    /// ```
    pub fn require(actor: &Actor, capability: Capability) -> Result<(), AccessError> {
        if actor.role.allows(capability) {
            Ok(())
        } else {
            log::warn!(
                "User {} denied: missing capability {capability}",
                actor.user_id
            );
            Err(AccessError::Forbidden(capability))
        }
    }
}
