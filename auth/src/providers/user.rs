//! User repository trait.

use crate::error::Result;
use crate::state::{AccountId, UserId};
use crate::user::{User, UserChanges};
use serde::{Deserialize, Serialize};

/// Offset pagination for user listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Number of records to skip.
    pub offset: usize,

    /// Maximum number of records to return.
    pub limit: usize,
}

impl Page {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 50;

    /// Create a page.
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// User persistence.
///
/// Users are addressed by `(account_id, id)`; the only account-independent
/// lookups are by token and by external identity.
pub trait UserRepository: Send + Sync {
    /// Store a new user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The email is already used in the account → `AuthError::Validation`
    /// - Storage fails → `AuthError::Persistence`
    fn create_user(&self, user: &User) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Get user by ID within an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - User not found → `AuthError::ResourceNotFound`
    fn get_user(
        &self,
        account_id: AccountId,
        id: UserId,
    ) -> impl std::future::Future<Output = Result<User>> + Send;

    /// Get user by email within an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - User not found → `AuthError::ResourceNotFound`
    fn get_user_by_email(
        &self,
        account_id: AccountId,
        email: &str,
    ) -> impl std::future::Future<Output = Result<User>> + Send;

    /// Get the user currently holding `token`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - No user holds the token → `AuthError::ResourceNotFound`
    fn get_user_by_token(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<User>> + Send;

    /// Get the user linked to an external identity within an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - User not found → `AuthError::ResourceNotFound`
    fn get_user_by_external_id(
        &self,
        account_id: AccountId,
        external_id: i64,
    ) -> impl std::future::Future<Output = Result<User>> + Send;

    /// Get every user, across accounts, linked to an external identity.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    fn get_users_by_external_id(
        &self,
        external_id: i64,
    ) -> impl std::future::Future<Output = Result<Vec<User>>> + Send;

    /// Apply a change set and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The new email is already used in the account → `AuthError::Validation`
    /// - Storage fails
    /// - User not found → `AuthError::ResourceNotFound`
    fn update_user_fields(
        &self,
        account_id: AccountId,
        id: UserId,
        changes: &UserChanges,
    ) -> impl std::future::Future<Output = Result<User>> + Send;

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - User not found → `AuthError::ResourceNotFound`
    fn delete_user(
        &self,
        account_id: AccountId,
        id: UserId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// List users of an account in creation order, optionally restricted to
    /// a single user.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    fn list_users(
        &self,
        account_id: AccountId,
        only: Option<UserId>,
        page: Page,
    ) -> impl std::future::Future<Output = Result<Vec<User>>> + Send;
}
