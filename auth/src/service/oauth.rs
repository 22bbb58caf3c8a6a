//! OAuth login and signup.

use super::{credentials_miss, AuthResult, IdentityService};
use crate::account::{derive_code, Account, AccountInfo};
use crate::constants::{login_methods, MIN_ACCOUNT_CODE_LENGTH, OAUTH_PASSWORD_LENGTH};
use crate::error::{AuthError, Result};
use crate::oauth::OAuthIntent;
use crate::providers::{AccountRepository, ExternalProfile, IdentityProvider, UserRepository};
use crate::state::{AccountId, Role};
use crate::token::new_opaque_code;
use crate::user::{NewUser, User};
use crate::utils::split_display_name;
use std::collections::BTreeSet;

/// What a completed OAuth callback produced.
#[derive(Debug, Clone)]
pub enum OAuthCallbackOutcome {
    /// Logged into the account named in the state.
    LoggedIn(AuthResult),

    /// Created a new account with the external identity as admin.
    SignedUp(AuthResult),

    /// Login without an account code: the accounts linked to the external
    /// identity, for the client to pick from. May be empty.
    AvailableAccounts(Vec<AccountInfo>),
}

impl<A, U, P> IdentityService<A, U, P>
where
    A: AccountRepository,
    U: UserRepository,
    P: IdentityProvider,
{
    /// Mint an OAuth state for `intent` and return the provider URL to
    /// redirect the user to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a signup's account name yields no
    /// usable code.
    pub fn initiate_oauth(&self, intent: OAuthIntent) -> Result<String> {
        if let OAuthIntent::Signup { account_name, .. } = &intent {
            if derive_code(account_name).len() < MIN_ACCOUNT_CODE_LENGTH {
                return Err(AuthError::validation(
                    "account_name",
                    format!("could not derive a valid account code from '{account_name}'"),
                ));
            }
        }

        let state = self.states.issue(intent)?;
        self.provider.authorize_url(&state.to_string())
    }

    /// Handle the provider's redirect back with `code` and `state`.
    ///
    /// The state is redeemed first, so a replayed callback fails before any
    /// provider call is made.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidState`: state malformed, unknown, replayed or
    ///   expired
    /// - `AuthError::ExternalProvider`: code exchange or profile fetch failed
    /// - `AuthError::InvalidCredentials`: login for an account the external
    ///   identity is not linked to
    /// - `AuthError::Validation`: signup with a profile that has no email,
    ///   or an account name whose code is taken
    pub async fn complete_oauth_callback(&self, code: &str, state: &str) -> Result<OAuthCallbackOutcome> {
        let state = self.states.consume(state)?;

        if code.trim().is_empty() {
            return Err(AuthError::validation("code", "missing authorization code"));
        }

        let access_token = self.provider.exchange_code(code).await?;
        let profile = self.provider.fetch_profile(&access_token).await?;

        tracing::debug!(
            provider = self.provider.name(),
            intent = state.intent.kind(),
            external_id = profile.external_id,
            "oauth profile fetched"
        );

        match state.intent {
            OAuthIntent::Login {
                account_code: Some(account_code),
            } if !account_code.trim().is_empty() => self
                .oauth_login(&account_code, &profile)
                .await
                .map(OAuthCallbackOutcome::LoggedIn),
            OAuthIntent::Login { .. } => self
                .available_accounts(profile.external_id)
                .await
                .map(OAuthCallbackOutcome::AvailableAccounts),
            OAuthIntent::Signup {
                account_name,
                given_name,
                family_name,
            } => self
                .oauth_signup(&account_name, given_name, family_name, profile)
                .await
                .map(OAuthCallbackOutcome::SignedUp),
        }
    }

    async fn oauth_login(&self, account_code: &str, profile: &ExternalProfile) -> Result<AuthResult> {
        let account = self
            .accounts
            .get_account_by_code(&derive_code(account_code))
            .await
            .map_err(credentials_miss("account"))?;

        let user = self
            .users
            .get_user_by_external_id(account.id, profile.external_id)
            .await
            .map_err(credentials_miss("external_id"))?;

        let method = format!("{}{}", login_methods::OAUTH_PREFIX, self.provider.name());
        self.issue_token(account, &user, &method).await
    }

    async fn available_accounts(&self, external_id: i64) -> Result<Vec<AccountInfo>> {
        let linked = self.users.get_users_by_external_id(external_id).await?;
        let ids: Vec<AccountId> = linked
            .iter()
            .map(|user| user.account_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let accounts = self.accounts.get_accounts_by_ids(&ids).await?;
        Ok(accounts.iter().map(Account::info).collect())
    }

    async fn oauth_signup(
        &self,
        account_name: &str,
        given_name: String,
        family_name: String,
        profile: ExternalProfile,
    ) -> Result<AuthResult> {
        let email = profile
            .email
            .clone()
            .ok_or_else(|| AuthError::validation("email", "external profile has no email address"))?;

        let (fallback_given, fallback_family) =
            split_display_name(&profile.display_name).unwrap_or_default();
        let given_name = non_empty_or(given_name, fallback_given);
        let family_name = non_empty_or(family_name, fallback_family);

        let account = Account::new(account_name)?;
        self.ensure_code_available(&account.code).await?;

        let mut admin = User::new(NewUser {
            account_id: account.id,
            given_name,
            family_name,
            email,
            password: new_opaque_code(OAUTH_PASSWORD_LENGTH),
            role: Role::Admin,
        })?;
        admin.profile.external_id = Some(profile.external_id);
        admin.profile.external_login = Some(profile.login);
        admin.profile.photo_url = profile.avatar_url;
        admin.profile.location = profile.location;

        let method = format!("{}{}", login_methods::OAUTH_PREFIX, self.provider.name());
        self.create_account_with_admin(account, admin, &method).await
    }
}

fn non_empty_or(value: String, fallback: String) -> String {
    if value.trim().is_empty() {
        fallback
    } else {
        value.trim().to_string()
    }
}
