//! Account repository trait.

use crate::account::{Account, AccountChanges};
use crate::error::Result;
use crate::state::AccountId;

/// Account persistence.
pub trait AccountRepository: Send + Sync {
    /// Store a new account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The code is already taken → `AuthError::Validation`
    /// - Storage fails → `AuthError::Persistence`
    fn create_account(
        &self,
        account: &Account,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Get account by ID.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - Account not found → `AuthError::ResourceNotFound`
    fn get_account(
        &self,
        id: AccountId,
    ) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Get account by its unique code.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - Account not found → `AuthError::ResourceNotFound`
    fn get_account_by_code(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Get every account whose id is in `ids`. Unknown ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    fn get_accounts_by_ids(
        &self,
        ids: &[AccountId],
    ) -> impl std::future::Future<Output = Result<Vec<Account>>> + Send;

    /// Apply a change set and return the updated account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - Account not found → `AuthError::ResourceNotFound`
    fn update_account_fields(
        &self,
        id: AccountId,
        changes: &AccountChanges,
    ) -> impl std::future::Future<Output = Result<Account>> + Send;

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Storage fails
    /// - Account not found → `AuthError::ResourceNotFound`
    fn delete_account(
        &self,
        id: AccountId,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}
