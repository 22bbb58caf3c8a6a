//! Shared harness for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use tenant_directory_auth::config::AuthConfig;
use tenant_directory_auth::mocks::{MockAccountRepository, MockIdentityProvider, MockUserRepository};
use tenant_directory_auth::{AuthResult, IdentityService, Session, SignupArgs};
use tracing_subscriber::EnvFilter;

/// Service type used across the integration tests.
pub type TestService = IdentityService<MockAccountRepository, MockUserRepository, MockIdentityProvider>;

/// Service plus handles onto its in-memory collaborators.
pub struct Harness {
    pub service: TestService,
    pub accounts: MockAccountRepository,
    pub users: MockUserRepository,
    pub provider: MockIdentityProvider,
}

/// Install a tracing subscriber once; honours `RUST_LOG`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn harness() -> Harness {
    harness_with_provider(MockIdentityProvider::default())
}

pub fn harness_with_provider(provider: MockIdentityProvider) -> Harness {
    harness_with(provider, AuthConfig::default())
}

pub fn harness_with(provider: MockIdentityProvider, config: AuthConfig) -> Harness {
    init_test_tracing();

    let accounts = MockAccountRepository::new();
    let users = MockUserRepository::new();
    let service = IdentityService::new(
        accounts.clone(),
        users.clone(),
        provider.clone(),
        config,
    );

    Harness {
        service,
        accounts,
        users,
        provider,
    }
}

pub fn signup_args(account_name: &str, email: &str) -> SignupArgs {
    SignupArgs {
        account_name: account_name.to_string(),
        given_name: "Ada".to_string(),
        family_name: "Lovelace".to_string(),
        email: email.to_string(),
        password: "massa123".to_string(),
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Resolve the session of a freshly authenticated user.
pub async fn session_for(service: &TestService, auth: &AuthResult) -> Session {
    service
        .authenticate_token(Some(&bearer(&auth.token)), auth.account.id)
        .await
        .unwrap()
}

/// Pull the `state` query parameter back out of an authorize URL.
pub fn state_from_url(url: &str) -> String {
    let (_, query) = url.split_once('?').unwrap();
    let params: HashMap<String, String> = serde_urlencoded::from_str(query).unwrap();
    params["state"].clone()
}
