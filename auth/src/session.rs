//! Bearer token validation.
//!
//! Turns a raw `Authorization` header plus the account addressed by the
//! request into a [`Session`]. Failures are reported in three buckets only:
//! `TokenInvalid`, `AccountMismatch` and `TokenExpired`.

use crate::constants::MIN_BEARER_TOKEN_LENGTH;
use crate::error::{AuthError, Result};
use crate::providers::UserRepository;
use crate::state::{AccountId, Session};
use chrono::{DateTime, Utc};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// # Errors
///
/// Returns `AuthError::TokenInvalid` if the header is absent, uses another
/// scheme, or carries an implausibly short token.
///
/// # Examples
///
/// ```
/// use tenant_directory_auth::session::parse_bearer;
///
/// let header = "Bearer 0123456789abcdefghij";
/// assert_eq!(parse_bearer(Some(header)).unwrap(), "0123456789abcdefghij");
/// assert!(parse_bearer(Some("Basic dXNlcjpwYXNz")).is_err());
/// assert!(parse_bearer(None).is_err());
/// ```
pub fn parse_bearer(authorization: Option<&str>) -> Result<&str> {
    let token = authorization
        .and_then(|header| header.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or(AuthError::TokenInvalid)?;

    if token.len() < MIN_BEARER_TOKEN_LENGTH {
        return Err(AuthError::TokenInvalid);
    }

    Ok(token)
}

/// Resolves bearer tokens to sessions through a [`UserRepository`].
#[derive(Debug)]
pub struct SessionResolver<'a, U> {
    users: &'a U,
}

impl<'a, U: UserRepository> SessionResolver<'a, U> {
    /// Create a resolver over `users`.
    #[must_use]
    pub const fn new(users: &'a U) -> Self {
        Self { users }
    }

    /// Validate `authorization` for a request addressing `account_id`.
    ///
    /// # Errors
    ///
    /// - `AuthError::TokenInvalid`: header missing or malformed, or no user
    ///   holds the token
    /// - `AuthError::AccountMismatch`: the token belongs to another account
    /// - `AuthError::TokenExpired`: the token's lifetime has passed
    pub async fn resolve(&self, authorization: Option<&str>, account_id: AccountId) -> Result<Session> {
        self.resolve_at(authorization, account_id, Utc::now()).await
    }

    /// [`resolve`](Self::resolve) against an explicit clock reading.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_at(
        &self,
        authorization: Option<&str>,
        account_id: AccountId,
        now: DateTime<Utc>,
    ) -> Result<Session> {
        let token = parse_bearer(authorization)?;

        let user = self.users.get_user_by_token(token).await.map_err(|e| {
            tracing::debug!(error = %e, "bearer token lookup failed");
            AuthError::TokenInvalid
        })?;

        if user.account_id != account_id {
            tracing::warn!(
                user_id = %user.id,
                token_account_id = %user.account_id,
                requested_account_id = %account_id,
                "bearer token used against another account"
            );
            return Err(AuthError::AccountMismatch);
        }

        if user.token_expired_at(now) {
            tracing::debug!(user_id = %user.id, "bearer token expired");
            return Err(AuthError::TokenExpired);
        }

        Ok(Session::new(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockUserRepository;
    use crate::state::Role;
    use crate::user::{NewUser, User, UserChanges};
    use chrono::Duration;

    const TOKEN: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

    async fn repo_with_token(expires_at: DateTime<Utc>) -> (MockUserRepository, User) {
        let repo = MockUserRepository::new();
        let user = User::new(NewUser {
            account_id: AccountId::new(),
            given_name: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "massa123".to_string(),
            role: Role::Admin,
        })
        .unwrap();
        repo.create_user(&user).await.unwrap();
        repo.update_user_fields(
            user.account_id,
            user.id,
            &UserChanges::issue_token(TOKEN.to_string(), expires_at),
        )
        .await
        .unwrap();
        (repo, user)
    }

    #[test]
    fn test_parse_bearer_rejects_malformed_headers() {
        for header in [
            None,
            Some(""),
            Some("Bearer"),
            Some("Bearer "),
            Some("bearer abcdefghijklmnopqrstuvwxyz"),
            Some("Token abcdefghijklmnopqrstuvwxyz"),
            Some("Bearer short"),
        ] {
            assert_eq!(parse_bearer(header), Err(AuthError::TokenInvalid), "{header:?}");
        }
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let (repo, user) = repo_with_token(Utc::now() + Duration::hours(1)).await;
        let header = format!("Bearer {TOKEN}");

        let session = SessionResolver::new(&repo)
            .resolve(Some(&header), user.account_id)
            .await
            .unwrap();
        assert_eq!(session.user_id(), user.id);
        assert_eq!(session.account_id(), user.account_id);
        assert_eq!(session.role(), Role::Admin);
    }

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let (repo, user) = repo_with_token(Utc::now() + Duration::hours(1)).await;
        let header = "Bearer zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";

        let result = SessionResolver::new(&repo).resolve(Some(header), user.account_id).await;
        assert_eq!(result, Err(AuthError::TokenInvalid));
    }

    #[tokio::test]
    async fn test_resolve_account_mismatch() {
        let (repo, _) = repo_with_token(Utc::now() + Duration::hours(1)).await;
        let header = format!("Bearer {TOKEN}");

        let result = SessionResolver::new(&repo)
            .resolve(Some(&header), AccountId::new())
            .await;
        assert_eq!(result, Err(AuthError::AccountMismatch));
    }

    #[tokio::test]
    async fn test_resolve_expiry_boundary() {
        let expires_at = Utc::now() + Duration::hours(1);
        let (repo, user) = repo_with_token(expires_at).await;
        let header = format!("Bearer {TOKEN}");
        let resolver = SessionResolver::new(&repo);

        let just_before = expires_at - Duration::milliseconds(1);
        assert!(resolver.resolve_at(Some(&header), user.account_id, just_before).await.is_ok());

        assert_eq!(
            resolver.resolve_at(Some(&header), user.account_id, expires_at).await,
            Err(AuthError::TokenExpired)
        );
    }
}
