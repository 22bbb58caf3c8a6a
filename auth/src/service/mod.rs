//! Identity use cases.
//!
//! [`IdentityService`] orchestrates signup, login, OAuth and user/account
//! mutation over the collaborator traits in [`crate::providers`]. Every use
//! case that acts on behalf of a caller takes the caller's [`Session`]
//! explicitly.
//!
//! # Example
//!
//! ```
//! use tenant_directory_auth::config::AuthConfig;
//! use tenant_directory_auth::mocks::{
//!     MockAccountRepository, MockIdentityProvider, MockUserRepository,
//! };
//! use tenant_directory_auth::service::{IdentityService, SignupArgs};
//!
//! # tokio_test::block_on(async {
//! let service = IdentityService::new(
//!     MockAccountRepository::new(),
//!     MockUserRepository::new(),
//!     MockIdentityProvider::default(),
//!     AuthConfig::default(),
//! );
//!
//! let result = service
//!     .signup(SignupArgs {
//!         account_name: "Acme Inc".to_string(),
//!         given_name: "Ada".to_string(),
//!         family_name: "Lovelace".to_string(),
//!         email: "ada@example.com".to_string(),
//!         password: "massa123".to_string(),
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(result.account.code, "acme-inc");
//! assert_eq!(result.token.len(), 60);
//! # });
//! ```

mod oauth;
mod password;
mod users;

pub use oauth::OAuthCallbackOutcome;
pub use password::SignupArgs;
pub use users::CreateUserArgs;

use crate::account::Account;
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::oauth::OAuthStateManager;
use crate::providers::{AccountRepository, IdentityProvider, UserRepository};
use crate::rbac::{self, Action};
use crate::session::SessionResolver;
use crate::state::{AccountId, Session};
use crate::token::new_session_token;
use crate::user::{User, UserChanges};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Outcome of a successful signup or login.
#[derive(Clone, Serialize)]
pub struct AuthResult {
    /// The account logged into.
    pub account: Account,

    /// The authenticated user, with the fresh token already stored.
    pub user: User,

    /// The bearer token to hand to the client.
    pub token: String,
}

impl fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResult")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Identity use cases over injected collaborators.
///
/// - `A`: account persistence
/// - `U`: user persistence
/// - `P`: external identity provider
#[derive(Debug)]
pub struct IdentityService<A, U, P> {
    accounts: A,
    users: U,
    provider: P,
    states: OAuthStateManager,
    config: AuthConfig,
}

impl<A, U, P> IdentityService<A, U, P>
where
    A: AccountRepository,
    U: UserRepository,
    P: IdentityProvider,
{
    /// Create a service with its own OAuth state manager.
    #[must_use]
    pub fn new(accounts: A, users: U, provider: P, config: AuthConfig) -> Self {
        let states = OAuthStateManager::new(config.state_ttl);
        Self {
            accounts,
            users,
            provider,
            states,
            config,
        }
    }

    /// Use a shared OAuth state manager.
    #[must_use]
    pub fn with_state_manager(mut self, states: OAuthStateManager) -> Self {
        self.states = states;
        self
    }

    /// The OAuth state manager (for periodic `purge_expired` calls).
    #[must_use]
    pub const fn state_manager(&self) -> &OAuthStateManager {
        &self.states
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Validate a bearer token for a request addressing `account_id`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenInvalid`, `AuthError::AccountMismatch` or
    /// `AuthError::TokenExpired`; see [`SessionResolver::resolve`].
    pub async fn authenticate_token(
        &self,
        authorization: Option<&str>,
        account_id: AccountId,
    ) -> Result<Session> {
        SessionResolver::new(&self.users)
            .resolve(authorization, account_id)
            .await
    }

    /// Revoke the caller's token.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    pub async fn logout(&self, session: &Session) -> Result<()> {
        rbac::authorize(session, Action::Logout)?;

        self.users
            .update_user_fields(
                session.account_id(),
                session.user_id(),
                &UserChanges::revoke_token(),
            )
            .await?;

        tracing::info!(
            account_id = %session.account_id(),
            user_id = %session.user_id(),
            request_id = %session.request_id,
            "logout successful"
        );
        Ok(())
    }

    /// Issue a fresh token for `user`, overwriting any previous one.
    async fn issue_token(&self, account: Account, user: &User, method: &str) -> Result<AuthResult> {
        let token = new_session_token();
        let expires_at = self.token_expiry()?;

        let user = self
            .users
            .update_user_fields(
                user.account_id,
                user.id,
                &UserChanges::issue_token(token.clone(), expires_at),
            )
            .await?;

        tracing::info!(
            account_id = %account.id,
            user_id = %user.id,
            method,
            token_expires_at = %expires_at,
            "login successful"
        );

        Ok(AuthResult {
            account,
            user,
            token,
        })
    }

    /// Persist a new account together with its admin user and first token.
    ///
    /// If the user cannot be stored the account is deleted again.
    async fn create_account_with_admin(
        &self,
        mut account: Account,
        mut admin: User,
        method: &str,
    ) -> Result<AuthResult> {
        account.owner_id = Some(admin.id);
        account.add_member(crate::account::Member {
            id: admin.id,
            role: admin.role,
            added_at: Utc::now(),
        });

        let token = new_session_token();
        let expires_at = self.token_expiry()?;

        self.accounts.create_account(&account).await?;

        admin.token = Some(token.clone());
        admin.token_expires_at = Some(expires_at);

        if let Err(e) = self.users.create_user(&admin).await {
            tracing::warn!(
                account_id = %account.id,
                error = %e,
                "admin user could not be stored, removing account"
            );
            if let Err(cleanup) = self.accounts.delete_account(account.id).await {
                tracing::error!(
                    account_id = %account.id,
                    error = %cleanup,
                    "orphaned account left behind after failed signup"
                );
            }
            return Err(e);
        }

        tracing::info!(
            account_id = %account.id,
            account_code = %account.code,
            user_id = %admin.id,
            method,
            token_expires_at = %expires_at,
            "signup successful"
        );

        Ok(AuthResult {
            account,
            user: admin,
            token,
        })
    }

    /// Expiry of a token issued now.
    fn token_expiry(&self) -> Result<DateTime<Utc>> {
        Utc::now()
            .checked_add_signed(self.config.token_lifetime)
            .ok_or_else(|| AuthError::Internal("token lifetime out of range".to_string()))
    }

    /// Fail if an account already uses `code`.
    async fn ensure_code_available(&self, code: &str) -> Result<()> {
        match self.accounts.get_account_by_code(code).await {
            Ok(_) => Err(AuthError::validation(
                "account_name",
                format!("account code '{code}' is already taken"),
            )),
            Err(AuthError::ResourceNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Collapse a lookup miss into `InvalidCredentials`, keeping real failures.
fn credentials_miss(what: &'static str) -> impl Fn(AuthError) -> AuthError {
    move |e| match e {
        AuthError::ResourceNotFound => {
            tracing::debug!(lookup = what, "login lookup missed");
            AuthError::InvalidCredentials
        }
        other => other,
    }
}
