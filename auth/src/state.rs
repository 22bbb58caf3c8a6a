//! Identifier, role and session types.
//!
//! All types are `Clone` so they can be handed to collaborators by value.

use crate::error::{AuthError, Result};
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for an account (tenant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub uuid::Uuid);

impl AccountId {
    /// Generate a new random `AccountId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for AccountId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AuthError::validation("account_id", "not a valid identifier"))
    }
}

/// Unique identifier for a user within an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for UserId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AuthError::validation("user_id", "not a valid identifier"))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Roles
// ═══════════════════════════════════════════════════════════════════════

/// Account-scoped role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full control over the account and all of its users.
    Admin,
    /// Hiring manager.
    HiringManager,
    /// Candidate.
    Candidate,
}

impl Role {
    /// Get the role name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::HiringManager => "hiring_manager",
            Self::Candidate => "candidate",
        }
    }

    /// Access tier used by the RBAC decision table.
    #[must_use]
    pub const fn tier(&self) -> RoleTier {
        match self {
            Self::Admin => RoleTier::Admin,
            Self::HiringManager | Self::Candidate => RoleTier::Member,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Self::Admin),
            "hiring_manager" => Ok(Self::HiringManager),
            "candidate" => Ok(Self::Candidate),
            _ => Err(AuthError::validation(
                "role",
                "must be one of admin, hiring_manager, candidate",
            )),
        }
    }
}

/// Two-tier access level derived from a [`Role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleTier {
    /// Account administrator.
    Admin,
    /// Any non-admin role.
    Member,
}

// ═══════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════

/// Authenticated identity attached to a single request.
///
/// Produced by [`crate::session::SessionResolver`] and passed explicitly to
/// every use case that needs a caller. Never cached across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Correlates log lines of one request.
    pub request_id: uuid::Uuid,

    /// The authenticated user, as loaded for this request.
    pub user: User,

    /// When the bearer token was validated.
    pub authenticated_at: DateTime<Utc>,
}

impl Session {
    /// Create a session for a user that was just authenticated.
    #[must_use]
    pub fn new(user: User) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4(),
            user,
            authenticated_at: Utc::now(),
        }
    }

    /// Account the session is scoped to.
    #[must_use]
    pub const fn account_id(&self) -> AccountId {
        self.user.account_id
    }

    /// The authenticated user's id.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user.id
    }

    /// The authenticated user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.user.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        assert_ne!(UserId::new(), UserId::new());
        assert_ne!(AccountId::new(), AccountId::new());
    }

    #[test]
    fn test_id_parse_roundtrip() {
        let id = AccountId::new();
        assert_eq!(id.to_string().parse::<AccountId>().unwrap(), id);
        assert!("nope".parse::<UserId>().is_err());
    }

    #[test]
    fn test_role_str() {
        assert_eq!(Role::Admin.as_str(), "admin");
        assert_eq!(Role::HiringManager.as_str(), "hiring_manager");
        assert_eq!(Role::Candidate.as_str(), "candidate");
        assert_eq!("hiring_manager".parse::<Role>().unwrap(), Role::HiringManager);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::HiringManager).unwrap();
        assert_eq!(json, "\"hiring_manager\"");
    }

    #[test]
    fn test_role_tiers() {
        assert_eq!(Role::Admin.tier(), RoleTier::Admin);
        assert_eq!(Role::HiringManager.tier(), RoleTier::Member);
        assert_eq!(Role::Candidate.tier(), RoleTier::Member);
    }
}
