//! Mock identity provider for testing.

use crate::error::{AuthError, Result};
use crate::providers::{ExternalProfile, IdentityProvider};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock identity provider.
///
/// Every code exchanges successfully and resolves to the configured profile,
/// unless built with [`MockIdentityProvider::failing`].
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    /// Profile returned by `fetch_profile`.
    pub profile: ExternalProfile,

    /// Whether to simulate success or failure.
    pub should_succeed: bool,

    exchanges: Arc<AtomicUsize>,
}

impl MockIdentityProvider {
    /// Create a mock provider that resolves every code to `profile`.
    #[must_use]
    pub fn new(profile: ExternalProfile) -> Self {
        Self {
            profile,
            should_succeed: true,
            exchanges: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock that fails the code exchange.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            should_succeed: false,
            ..Self::default()
        }
    }

    /// Number of code exchanges attempted (for testing).
    #[must_use]
    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new(ExternalProfile {
            external_id: 583_231,
            login: "octocat".to_string(),
            display_name: "Mona Lisa Octocat".to_string(),
            email: Some("octocat@example.com".to_string()),
            avatar_url: "https://avatars.example.com/u/583231".to_string(),
            location: "San Francisco".to_string(),
        })
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        let query = serde_urlencoded::to_string([("client_id", "mock-client"), ("state", state)])
            .map_err(|e| AuthError::Internal(format!("Failed to build URL: {e}")))?;
        Ok(format!("https://identity.example.com/authorize?{query}"))
    }

    fn exchange_code(&self, code: &str) -> impl Future<Output = Result<String>> + Send {
        let should_succeed = self.should_succeed;
        let exchanges = Arc::clone(&self.exchanges);
        let code = code.to_string();

        async move {
            exchanges.fetch_add(1, Ordering::SeqCst);
            if !should_succeed {
                return Err(AuthError::ExternalProvider(
                    "token exchange failed".to_string(),
                ));
            }
            Ok(format!("mock-access-token-{code}"))
        }
    }

    fn fetch_profile(&self, access_token: &str) -> impl Future<Output = Result<ExternalProfile>> + Send {
        let should_succeed = self.should_succeed;
        let profile = self.profile.clone();
        let authorized = access_token.starts_with("mock-access-token-");

        async move {
            if !should_succeed || !authorized {
                return Err(AuthError::ExternalProvider(
                    "profile fetch failed".to_string(),
                ));
            }
            Ok(profile)
        }
    }
}
