//! Password signup and login.

use super::{credentials_miss, AuthResult, IdentityService};
use crate::account::{derive_code, Account};
use crate::constants::{login_methods, MIN_ACCOUNT_CODE_LENGTH};
use crate::credentials::PasswordHash;
use crate::error::{AuthError, Result};
use crate::providers::{AccountRepository, IdentityProvider, UserRepository};
use crate::state::Role;
use crate::user::{NewUser, User};
use serde::Deserialize;

/// Arguments for creating an account with its admin user.
#[derive(Clone, Deserialize)]
pub struct SignupArgs {
    /// Display name of the account; its code is derived from it.
    pub account_name: String,
    /// Admin's given name.
    pub given_name: String,
    /// Admin's family name.
    pub family_name: String,
    /// Admin's email.
    pub email: String,
    /// Admin's plaintext password.
    pub password: String,
}

impl std::fmt::Debug for SignupArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupArgs")
            .field("account_name", &self.account_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl<A, U, P> IdentityService<A, U, P>
where
    A: AccountRepository,
    U: UserRepository,
    P: IdentityProvider,
{
    /// Create an account and its admin user, and log the admin in.
    ///
    /// # Errors
    ///
    /// - `AuthError::Validation`: the account name yields no usable code or
    ///   the code is taken, or the email/password is malformed
    /// - `AuthError::Persistence`: storage failed (the account is removed
    ///   again if the admin could not be stored)
    pub async fn signup(&self, args: SignupArgs) -> Result<AuthResult> {
        let account = Account::new(&args.account_name)?;
        self.ensure_code_available(&account.code).await?;

        let admin = User::new(NewUser {
            account_id: account.id,
            given_name: args.given_name.trim().to_string(),
            family_name: args.family_name.trim().to_string(),
            email: args.email.trim().to_string(),
            password: args.password,
            role: Role::Admin,
        })?;

        self.create_account_with_admin(account, admin, login_methods::PASSWORD)
            .await
    }

    /// Log in with account code, email and password.
    ///
    /// The account code is normalized the same way it was derived, so
    /// `"Acme Inc"` finds `acme-inc`. Every failure runs exactly one Argon2
    /// verification, so response time does not reveal which lookup missed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown account, an
    /// unknown email or a wrong password alike, or `AuthError::Persistence`
    /// if storage fails.
    pub async fn login(&self, account_code: &str, email: &str, password: &str) -> Result<AuthResult> {
        let code = derive_code(account_code);
        if code.len() < MIN_ACCOUNT_CODE_LENGTH {
            tracing::debug!("login with unusable account code");
            PasswordHash::verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        }

        let account = self
            .accounts
            .get_account_by_code(&code)
            .await
            .map_err(password_miss("account", password))?;

        let user = self
            .users
            .get_user_by_email(account.id, email.trim())
            .await
            .map_err(password_miss("email", password))?;

        if let Err(e) = user.check_password(password) {
            tracing::debug!(account_id = %account.id, user_id = %user.id, "password mismatch");
            return Err(e);
        }

        self.issue_token(account, &user, login_methods::PASSWORD).await
    }
}

/// Like [`credentials_miss`], but a miss still pays for one password
/// verification.
fn password_miss<'a>(what: &'static str, password: &'a str) -> impl FnOnce(AuthError) -> AuthError + 'a {
    move |e| {
        let e = credentials_miss(what)(e);
        if e == AuthError::InvalidCredentials {
            PasswordHash::verify_dummy(password);
        }
        e
    }
}
