//! User model and typed update sets.

use crate::credentials::PasswordHash;
use crate::error::{AuthError, Result};
use crate::state::{AccountId, Role, UserId};
use crate::utils::{non_blank, validate_email, validate_password};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Given name.
    pub given_name: String,

    /// Family name.
    pub family_name: String,

    /// Photo URL (from the external identity, if any).
    pub photo_url: String,

    /// Free-form location.
    pub location: String,

    /// Linked external identity id.
    pub external_id: Option<i64>,

    /// Linked external identity login.
    pub external_login: Option<String>,

    /// Suspended users keep their record but are hidden from listings by the
    /// transport layer.
    pub is_suspended: bool,
}

/// A user. Belongs to exactly one account.
///
/// The password hash and bearer token are never serialized.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Owning account.
    pub account_id: AccountId,

    /// User ID (unique within the account).
    pub id: UserId,

    /// Email (unique within the account).
    pub email: String,

    /// Salted password hash.
    #[serde(skip)]
    pub password_hash: Option<PasswordHash>,

    /// Current bearer token. Re-login overwrites it.
    #[serde(skip)]
    pub token: Option<String>,

    /// Bearer token expiry.
    #[serde(skip)]
    pub token_expires_at: Option<DateTime<Utc>>,

    /// Profile.
    pub profile: UserProfile,

    /// Role within the account.
    pub role: Role,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("account_id", &self.account_id)
            .field("id", &self.id)
            .field("email", &self.email)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("token_expires_at", &self.token_expires_at)
            .field("profile", &self.profile)
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Arguments for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Owning account.
    pub account_id: AccountId,
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Email.
    pub email: String,
    /// Plaintext password (hashed immediately).
    pub password: String,
    /// Role within the account.
    pub role: Role,
}

impl User {
    /// Create a user, validating input and hashing the password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed email or a password
    /// shorter than the minimum length.
    pub fn new(args: NewUser) -> Result<Self> {
        validate_email(&args.email)?;
        validate_password(&args.password)?;

        let mut user = Self {
            account_id: args.account_id,
            id: UserId::new(),
            email: args.email,
            password_hash: None,
            token: None,
            token_expires_at: None,
            profile: UserProfile {
                given_name: args.given_name,
                family_name: args.family_name,
                ..UserProfile::default()
            },
            role: args.role,
            created_at: Utc::now(),
            updated_at: None,
        };
        user.set_password(&args.password)?;

        Ok(user)
    }

    /// Replace the password hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if hashing fails.
    pub fn set_password(&mut self, plaintext: &str) -> Result<()> {
        self.password_hash = Some(PasswordHash::new(plaintext)?);
        Ok(())
    }

    /// Check a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on mismatch or when the user
    /// has no password hash.
    pub fn check_password(&self, plaintext: &str) -> Result<()> {
        match &self.password_hash {
            Some(hash) => hash.verify(plaintext),
            None => {
                PasswordHash::verify_dummy(plaintext);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// `true` if the stored token has expired at `now`.
    #[must_use]
    pub fn token_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at.is_none_or(|expires_at| now >= expires_at)
    }
}

/// Requested change to a user's mutable fields.
///
/// Absent or blank fields are no-ops, never set-to-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    /// New email.
    pub email: Option<String>,

    /// New plaintext password.
    pub password: Option<String>,

    /// New given name.
    pub given_name: Option<String>,

    /// New family name.
    pub family_name: Option<String>,
}

/// Bearer token mutation.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenChange {
    /// Store a freshly issued token, overwriting any previous one.
    Issue {
        /// The token.
        token: String,
        /// Its expiry.
        expires_at: DateTime<Utc>,
    },
    /// Clear the stored token.
    Revoke,
}

impl fmt::Debug for TokenChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue { expires_at, .. } => f
                .debug_struct("Issue")
                .field("token", &"<redacted>")
                .field("expires_at", expires_at)
                .finish(),
            Self::Revoke => f.write_str("Revoke"),
        }
    }
}

/// Field-level changes handed to persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    /// New email.
    pub email: Option<String>,

    /// New password hash.
    pub password_hash: Option<PasswordHash>,

    /// New given name.
    pub given_name: Option<String>,

    /// New family name.
    pub family_name: Option<String>,

    /// Token mutation.
    pub token: Option<TokenChange>,
}

impl UserChanges {
    /// Change set that only issues a token.
    #[must_use]
    pub const fn issue_token(token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            email: None,
            password_hash: None,
            given_name: None,
            family_name: None,
            token: Some(TokenChange::Issue { token, expires_at }),
        }
    }

    /// Change set that only revokes the token.
    #[must_use]
    pub const fn revoke_token() -> Self {
        Self {
            email: None,
            password_hash: None,
            given_name: None,
            family_name: None,
            token: Some(TokenChange::Revoke),
        }
    }

    /// Validate a patch and turn it into a change set.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed email or a too short
    /// password, `AuthError::Internal` if hashing fails.
    pub fn from_patch(patch: &UserPatch) -> Result<Self> {
        let email = match non_blank(patch.email.as_deref()) {
            Some(email) => {
                validate_email(email)?;
                Some(email.to_string())
            }
            None => None,
        };

        let password_hash = match non_blank(patch.password.as_deref()) {
            Some(password) => {
                validate_password(password)?;
                Some(PasswordHash::new(password)?)
            }
            None => None,
        };

        Ok(Self {
            email,
            password_hash,
            given_name: non_blank(patch.given_name.as_deref()).map(str::to_string),
            family_name: non_blank(patch.family_name.as_deref()).map(str::to_string),
            token: None,
        })
    }

    /// `true` if nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.given_name.is_none()
            && self.family_name.is_none()
            && self.token.is_none()
    }

    /// Apply these changes to an in-memory user.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash = Some(hash.clone());
        }
        if let Some(given_name) = &self.given_name {
            user.profile.given_name.clone_from(given_name);
        }
        if let Some(family_name) = &self.family_name {
            user.profile.family_name.clone_from(family_name);
        }
        match &self.token {
            Some(TokenChange::Issue { token, expires_at }) => {
                user.token = Some(token.clone());
                user.token_expires_at = Some(*expires_at);
            }
            Some(TokenChange::Revoke) => {
                user.token = None;
                user.token_expires_at = None;
            }
            None => {}
        }
        user.updated_at = Some(Utc::now());
    }
}
