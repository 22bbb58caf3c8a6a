//! Integration tests for password signup, login, token validation and logout.

mod common;

use chrono::{Duration, Utc};
use common::{bearer, harness, harness_with, session_for, signup_args};
use std::time::Instant;
use tenant_directory_auth::providers::{AccountRepository, UserRepository};
use tenant_directory_auth::config::AuthConfig;
use tenant_directory_auth::mocks::MockIdentityProvider;
use tenant_directory_auth::{AccountId, AuthError, IdentityService, Role};

#[tokio::test]
async fn test_signup_acme_scenario() {
    let h = harness();

    let result = h
        .service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();

    assert_eq!(result.account.code, "acme-inc");
    assert_eq!(result.account.name, "Acme Inc");
    assert_eq!(result.user.role, Role::Admin);
    assert_eq!(result.user.role.as_str(), "admin");
    assert_eq!(result.token.len(), 60);
    assert_eq!(result.user.token.as_deref(), Some(result.token.as_str()));

    // The admin is the owner and the only member.
    assert_eq!(result.account.owner_id, Some(result.user.id));
    assert_eq!(result.account.members.len(), 1);
    assert_eq!(result.account.members[0].id, result.user.id);
    assert_eq!(result.account.members[0].role, Role::Admin);

    let stored = h.accounts.get_account_by_code("acme-inc").await.unwrap();
    assert_eq!(stored.id, result.account.id);

    let session = session_for(&h.service, &result).await;
    assert_eq!(session.user_id(), result.user.id);
}

#[tokio::test]
async fn test_duplicate_signup_fails() {
    let h = harness();
    h.service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();

    let second = h
        .service
        .signup(signup_args("ACME, inc.", "b@example.com"))
        .await;

    assert!(matches!(
        second,
        Err(AuthError::Validation {
            field: "account_name",
            ..
        })
    ));
    assert_eq!(h.accounts.len(), 1);
    assert_eq!(h.users.len(), 1);
}

#[tokio::test]
async fn test_signup_rejects_bad_input_before_storing() {
    let h = harness();

    let mut args = signup_args("Acme Inc", "a@example.com");
    args.password = "short".to_string();
    assert!(matches!(
        h.service.signup(args).await,
        Err(AuthError::Validation { field: "password", .. })
    ));

    let args = signup_args("Acme Inc", "not-an-email");
    assert!(matches!(
        h.service.signup(args).await,
        Err(AuthError::Validation { field: "email", .. })
    ));

    let args = signup_args("!", "a@example.com");
    assert!(matches!(
        h.service.signup(args).await,
        Err(AuthError::Validation {
            field: "account_name",
            ..
        })
    ));

    assert!(h.accounts.is_empty());
    assert!(h.users.is_empty());
}

#[tokio::test]
async fn test_signup_removes_account_when_admin_cannot_be_stored() {
    let h = harness();
    h.users.fail_creates(true);

    let result = h.service.signup(signup_args("Acme Inc", "a@example.com")).await;

    assert!(matches!(result, Err(AuthError::Persistence(_))));
    assert!(h.accounts.is_empty());

    // The code is free again.
    h.users.fail_creates(false);
    assert!(h.service.signup(signup_args("Acme Inc", "a@example.com")).await.is_ok());
}

#[tokio::test]
async fn test_signup_failure_reported_even_if_cleanup_fails() {
    let h = harness();
    h.users.fail_creates(true);
    h.accounts.fail_deletes(true);

    let result = h.service.signup(signup_args("Acme Inc", "a@example.com")).await;

    assert!(matches!(result, Err(AuthError::Persistence(ref m)) if m == "insert failed"));
    assert_eq!(h.accounts.len(), 1);
}

#[tokio::test]
async fn test_login_issues_fresh_token() {
    let h = harness();
    let signup = h
        .service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();

    let login = h
        .service
        .login("Acme Inc", "a@example.com", "massa123")
        .await
        .unwrap();

    assert_eq!(login.account.id, signup.account.id);
    assert_eq!(login.user.id, signup.user.id);
    assert_eq!(login.token.len(), 60);
    assert_ne!(login.token, signup.token);

    // Re-login overwrites the previous token.
    let old = h
        .service
        .authenticate_token(Some(&bearer(&signup.token)), signup.account.id)
        .await;
    assert_eq!(old, Err(AuthError::TokenInvalid));

    let session = session_for(&h.service, &login).await;
    assert_eq!(session.user_id(), login.user.id);
}

#[tokio::test]
async fn test_login_accepts_code_or_name() {
    let h = harness();
    h.service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();

    assert!(h.service.login("acme-inc", "a@example.com", "massa123").await.is_ok());
    assert!(h.service.login("  ACME inc ", "a@example.com", "massa123").await.is_ok());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness();
    h.service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();

    let wrong_password = h
        .service
        .login("acme-inc", "a@example.com", "massa124")
        .await
        .unwrap_err();
    let unknown_email = h
        .service
        .login("acme-inc", "nobody@example.com", "massa123")
        .await
        .unwrap_err();
    let unknown_account = h
        .service
        .login("globex", "a@example.com", "massa123")
        .await
        .unwrap_err();
    let unusable_code = h
        .service
        .login("!", "a@example.com", "massa123")
        .await
        .unwrap_err();

    for err in [&wrong_password, &unknown_email, &unknown_account, &unusable_code] {
        assert_eq!(*err, AuthError::InvalidCredentials);
        assert_eq!(err.to_string(), "invalid account, email or password");
    }
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_login_misses_take_as_long_as_wrong_passwords() {
    let h = harness();
    h.service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();

    // Build the fixed comparison hash outside the measured section.
    let _ = h.service.login("acme-inc", "nobody@example.com", "massa123").await;

    let started = Instant::now();
    for _ in 0..3 {
        let _ = h.service.login("acme-inc", "a@example.com", "massa124").await;
    }
    let wrong_password = started.elapsed();

    let started = Instant::now();
    for _ in 0..3 {
        let _ = h.service.login("acme-inc", "nobody@example.com", "massa123").await;
    }
    let unknown_email = started.elapsed();

    assert!(
        unknown_email * 4 >= wrong_password,
        "unknown email {unknown_email:?} vs wrong password {wrong_password:?}"
    );
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let h = harness();
    let signup = h
        .service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();

    h.users.set_token_expiry(
        signup.account.id,
        signup.user.id,
        Utc::now() - Duration::seconds(1),
    );

    // The token string still matches a stored record.
    let stored = h.users.get_user_by_token(&signup.token).await.unwrap();
    assert_eq!(stored.id, signup.user.id);

    let result = h
        .service
        .authenticate_token(Some(&bearer(&signup.token)), signup.account.id)
        .await;
    assert_eq!(result, Err(AuthError::TokenExpired));
}

#[tokio::test]
async fn test_token_is_scoped_to_its_account() {
    let h = harness();
    let acme = h
        .service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();
    let globex = h
        .service
        .signup(signup_args("Globex", "g@example.com"))
        .await
        .unwrap();

    let result = h
        .service
        .authenticate_token(Some(&bearer(&acme.token)), globex.account.id)
        .await;
    assert_eq!(result, Err(AuthError::AccountMismatch));

    let result = h
        .service
        .authenticate_token(Some(&bearer(&acme.token)), AccountId::new())
        .await;
    assert_eq!(result, Err(AuthError::AccountMismatch));
}

#[tokio::test]
async fn test_malformed_authorization_headers() {
    let h = harness();
    let signup = h
        .service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();

    let raw = signup.token.clone();
    let basic = format!("Basic {raw}");
    for header in [None, Some(raw.as_str()), Some(basic.as_str()), Some("Bearer abc")] {
        let result = h.service.authenticate_token(header, signup.account.id).await;
        assert_eq!(result, Err(AuthError::TokenInvalid), "{header:?}");
    }
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let h = harness();
    let signup = h
        .service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();
    let session = session_for(&h.service, &signup).await;

    h.service.logout(&session).await.unwrap();

    let result = h
        .service
        .authenticate_token(Some(&bearer(&signup.token)), signup.account.id)
        .await;
    assert_eq!(result, Err(AuthError::TokenInvalid));

    // Logging in again works.
    let login = h
        .service
        .login("acme-inc", "a@example.com", "massa123")
        .await
        .unwrap();
    assert!(
        h.service
            .authenticate_token(Some(&bearer(&login.token)), login.account.id)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_out_of_range_token_lifetime_fails_without_panicking() {
    let config = AuthConfig::new().with_token_lifetime(Duration::hours(1_000_000_000_000));
    let h = harness_with(MockIdentityProvider::default(), config.clone());

    let result = h.service.signup(signup_args("Acme Inc", "a@example.com")).await;
    assert!(matches!(result, Err(AuthError::Internal(_))));
    assert!(h.accounts.is_empty());
    assert!(h.users.is_empty());

    // Login against accounts created under a sane configuration.
    let sane = harness();
    sane.service
        .signup(signup_args("Acme Inc", "a@example.com"))
        .await
        .unwrap();
    let misconfigured = IdentityService::new(
        sane.accounts.clone(),
        sane.users.clone(),
        sane.provider.clone(),
        config,
    );
    let result = misconfigured.login("acme-inc", "a@example.com", "massa123").await;
    assert!(matches!(result, Err(AuthError::Internal(_))));
}
