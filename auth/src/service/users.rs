//! User and account management on behalf of an authenticated caller.

use super::IdentityService;
use crate::account::{Account, AccountChanges, AccountPatch, Member};
use crate::error::{AuthError, Result};
use crate::providers::{AccountRepository, IdentityProvider, Page, UserRepository};
use crate::rbac::{self, Action, Decision};
use crate::state::{AccountId, Role, Session, UserId};
use crate::user::{NewUser, User, UserChanges, UserPatch};
use chrono::Utc;
use serde::Deserialize;

/// Arguments for adding a user to the caller's account.
#[derive(Clone, Deserialize)]
pub struct CreateUserArgs {
    /// Given name.
    pub given_name: String,
    /// Family name.
    pub family_name: String,
    /// Email, unique within the account.
    pub email: String,
    /// Initial plaintext password.
    pub password: String,
    /// Role within the account.
    pub role: Role,
}

impl std::fmt::Debug for CreateUserArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserArgs")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl<A, U, P> IdentityService<A, U, P>
where
    A: AccountRepository,
    U: UserRepository,
    P: IdentityProvider,
{
    /// Add a user to the caller's account and register it as a member.
    ///
    /// # Errors
    ///
    /// - `AuthError::AccessDenied`: caller is not an admin
    /// - `AuthError::Validation`: malformed input or email already in use
    /// - `AuthError::Persistence`: storage failed (the user is removed again
    ///   if the member list could not be updated)
    pub async fn create_user(&self, session: &Session, args: CreateUserArgs) -> Result<User> {
        rbac::authorize(session, Action::CreateUser)?;
        let account_id = session.account_id();

        let user = User::new(NewUser {
            account_id,
            given_name: args.given_name.trim().to_string(),
            family_name: args.family_name.trim().to_string(),
            email: args.email.trim().to_string(),
            password: args.password,
            role: args.role,
        })?;

        match self.users.get_user_by_email(account_id, &user.email).await {
            Ok(_) => return Err(AuthError::validation("email", "already in use")),
            Err(AuthError::ResourceNotFound) => {}
            Err(e) => return Err(e),
        }

        self.users.create_user(&user).await?;

        if let Err(e) = self.add_member(account_id, &user).await {
            tracing::warn!(
                account_id = %account_id,
                user_id = %user.id,
                error = %e,
                "member list could not be updated, removing user"
            );
            if let Err(cleanup) = self.users.delete_user(account_id, user.id).await {
                tracing::error!(
                    account_id = %account_id,
                    user_id = %user.id,
                    error = %cleanup,
                    "user left without account membership"
                );
            }
            return Err(e);
        }

        tracing::info!(
            account_id = %account_id,
            user_id = %user.id,
            role = %user.role,
            created_by = %session.user_id(),
            "user created"
        );
        Ok(user)
    }

    async fn add_member(&self, account_id: AccountId, user: &User) -> Result<()> {
        let mut account = self.accounts.get_account(account_id).await?;
        account.add_member(Member {
            id: user.id,
            role: user.role,
            added_at: Utc::now(),
        });
        let changes = AccountChanges {
            members: Some(account.members),
            ..AccountChanges::default()
        };
        self.accounts.update_account_fields(account_id, &changes).await?;
        Ok(())
    }

    /// Apply a partial update to a user of the caller's account.
    ///
    /// Absent or blank fields are left untouched; a new password is
    /// re-hashed before it reaches persistence.
    ///
    /// # Errors
    ///
    /// - `AuthError::AccountMismatch`: `account_id` is not the caller's
    /// - `AuthError::AccessDenied`: non-admin updating someone else
    /// - `AuthError::ResourceNotFound`: no such user in the account
    /// - `AuthError::Validation`: malformed email or too short password
    pub async fn update_user(
        &self,
        session: &Session,
        account_id: AccountId,
        user_id: UserId,
        patch: UserPatch,
    ) -> Result<User> {
        ensure_same_account(session, account_id)?;
        rbac::authorize(session, Action::UpdateUser { target: user_id })?;

        let current = self.users.get_user(account_id, user_id).await?;
        let changes = UserChanges::from_patch(&patch)?;
        if changes.is_empty() {
            return Ok(current);
        }

        let updated = self
            .users
            .update_user_fields(account_id, user_id, &changes)
            .await?;

        tracing::info!(
            account_id = %account_id,
            user_id = %user_id,
            updated_by = %session.user_id(),
            email_changed = changes.email.is_some(),
            password_changed = changes.password_hash.is_some(),
            "user updated"
        );
        Ok(updated)
    }

    /// Apply a partial update to the caller's account. Admin only.
    ///
    /// The account code never changes, even when the name does.
    ///
    /// # Errors
    ///
    /// - `AuthError::AccountMismatch`: `account_id` is not the caller's
    /// - `AuthError::AccessDenied`: caller is not an admin
    /// - `AuthError::ResourceNotFound`: account no longer exists
    pub async fn update_account(
        &self,
        session: &Session,
        account_id: AccountId,
        patch: AccountPatch,
    ) -> Result<Account> {
        ensure_same_account(session, account_id)?;
        rbac::authorize(session, Action::UpdateAccount)?;

        let current = self.accounts.get_account(account_id).await?;
        let changes = AccountChanges::from_patch(&current, &patch);
        if changes.is_empty() {
            return Ok(current);
        }

        let updated = self
            .accounts
            .update_account_fields(account_id, &changes)
            .await?;

        tracing::info!(
            account_id = %account_id,
            updated_by = %session.user_id(),
            "account updated"
        );
        Ok(updated)
    }

    /// List users of the caller's account.
    ///
    /// Admins see everyone; other roles see only their own record.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    pub async fn list_users(&self, session: &Session, page: Page) -> Result<Vec<User>> {
        let only = match rbac::authorize(session, Action::ListUsers)? {
            Decision::AllowOwnOnly => Some(session.user_id()),
            Decision::Allow | Decision::Deny => None,
        };

        self.users
            .list_users(session.account_id(), only, page)
            .await
    }
}

fn ensure_same_account(session: &Session, account_id: AccountId) -> Result<()> {
    if session.account_id() == account_id {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %session.user_id(),
            session_account_id = %session.account_id(),
            requested_account_id = %account_id,
            "cross-account request rejected"
        );
        Err(AuthError::AccountMismatch)
    }
}
