//! External identity provider trait.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Profile of an external identity, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
    /// Stable provider-side user id.
    pub external_id: i64,

    /// Provider login (handle).
    pub login: String,

    /// Display name; may be empty.
    pub display_name: String,

    /// Public email, if the provider exposes one.
    pub email: Option<String>,

    /// Avatar URL; may be empty.
    pub avatar_url: String,

    /// Free-form location; may be empty.
    pub location: String,
}

/// A single external OAuth identity provider.
///
/// Calls are made once per callback and never retried here.
pub trait IdentityProvider: Send + Sync {
    /// Short provider name used in log fields (e.g. `github`).
    fn name(&self) -> &'static str;

    /// Build the URL to send the user to, embedding `state`.
    ///
    /// # Errors
    ///
    /// Returns error if URL construction fails.
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Exchange an authorization code for a provider access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ExternalProvider` if:
    /// - Network request fails
    /// - Provider rejects the code
    /// - Response is malformed
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Fetch the profile behind an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ExternalProvider` if the request fails or the
    /// response is malformed.
    fn fetch_profile(
        &self,
        access_token: &str,
    ) -> impl std::future::Future<Output = Result<ExternalProfile>> + Send;
}
