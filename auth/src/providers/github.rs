//! GitHub OAuth provider implementation.

use crate::config::GitHubConfig;
use crate::error::{AuthError, Result};
use crate::providers::{ExternalProfile, IdentityProvider};
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_URL: &str = "https://api.github.com/user";
const GITHUB_V3_JSON: &str = "application/vnd.github.v3+json";

/// GitHub OAuth provider.
///
/// # Configuration
///
/// 1. Register an OAuth App under GitHub developer settings
/// 2. Set its callback URL to the redirect URI
/// 3. Set environment variables:
///    - `GITHUB_CLIENT_ID`
///    - `GITHUB_CLIENT_SECRET`
///    - `GITHUB_REDIRECT_URI`
///
/// # Example
///
/// ```no_run
/// use tenant_directory_auth::config::GitHubConfig;
/// use tenant_directory_auth::providers::GitHubProvider;
///
/// # fn main() -> tenant_directory_auth::Result<()> {
/// let github = GitHubProvider::new(GitHubConfig::from_env()?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct GitHubProvider {
    config: GitHubConfig,
    http_client: Client,
}

impl GitHubProvider {
    /// Create a new GitHub provider.
    #[must_use]
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    #[must_use]
    pub fn with_http_client(mut self, http_client: Client) -> Self {
        self.http_client = http_client;
        self
    }
}

impl IdentityProvider for GitHubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        let scope = self.config.scopes.join(" ");
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", state),
        ];

        let query = serde_urlencoded::to_string(params)
            .map_err(|e| AuthError::Internal(format!("Failed to build URL: {e}")))?;

        Ok(format!("{AUTHORIZE_URL}?{query}"))
    }

    async fn exchange_code(&self, code: &str) -> Result<String> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http_client
            .post(ACCESS_TOKEN_URL)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, env!("CARGO_PKG_NAME"))
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::ExternalProvider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "GitHub token exchange failed: {}", error_body);
            return Err(AuthError::ExternalProvider(
                "token exchange failed".to_string(),
            ));
        }

        let token_response: GitHubTokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ExternalProvider(e.to_string()))?;

        // GitHub reports a rejected code with 200 and an `error` field.
        match token_response.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(access_token),
            _ => {
                tracing::warn!(
                    error = token_response.error.as_deref().unwrap_or("missing access_token"),
                    description = token_response.error_description.as_deref().unwrap_or(""),
                    "GitHub rejected authorization code"
                );
                Err(AuthError::ExternalProvider(
                    "token exchange failed".to_string(),
                ))
            }
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile> {
        let response = self
            .http_client
            .get(USER_URL)
            .bearer_auth(access_token)
            .header(ACCEPT, GITHUB_V3_JSON)
            .header(USER_AGENT, env!("CARGO_PKG_NAME"))
            .send()
            .await
            .map_err(|e| AuthError::ExternalProvider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "GitHub user request failed: {}", error_body);
            return Err(AuthError::ExternalProvider(
                "profile fetch failed".to_string(),
            ));
        }

        let github_user: GitHubUser = response
            .json()
            .await
            .map_err(|e| AuthError::ExternalProvider(e.to_string()))?;

        Ok(github_user.into())
    }
}

/// GitHub's access token endpoint response format.
#[derive(Debug, Deserialize)]
struct GitHubTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// GitHub's `/user` response format (the fields we use).
#[derive(Debug, Deserialize)]
struct GitHubUser {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
    location: Option<String>,
}

impl From<GitHubUser> for ExternalProfile {
    fn from(user: GitHubUser) -> Self {
        Self {
            external_id: user.id,
            login: user.login,
            display_name: user.name.unwrap_or_default(),
            email: user.email.filter(|email| !email.trim().is_empty()),
            avatar_url: user.avatar_url.unwrap_or_default(),
            location: user.location.unwrap_or_default(),
        }
    }
}
