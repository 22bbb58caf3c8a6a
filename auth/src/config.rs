//! Authentication configuration.
//!
//! Configuration values are provided by the application. `from_env`
//! constructors exist for binaries that configure themselves from the
//! process environment.

use crate::error::{AuthError, Result};
use chrono::{Duration, Utc};

/// Environment variable holding the GitHub OAuth client id.
pub const ENV_GITHUB_CLIENT_ID: &str = "GITHUB_CLIENT_ID";
/// Environment variable holding the GitHub OAuth client secret.
pub const ENV_GITHUB_CLIENT_SECRET: &str = "GITHUB_CLIENT_SECRET";
/// Environment variable holding the GitHub OAuth redirect URI.
pub const ENV_GITHUB_REDIRECT_URI: &str = "GITHUB_REDIRECT_URI";
/// Optional override of the session token lifetime, in hours.
pub const ENV_TOKEN_LIFETIME_HOURS: &str = "AUTH_TOKEN_LIFETIME_HOURS";
/// Optional override of the OAuth state TTL, in minutes.
pub const ENV_STATE_TTL_MINUTES: &str = "OAUTH_STATE_TTL_MINUTES";

/// GitHub OAuth application configuration.
#[derive(Clone)]
pub struct GitHubConfig {
    /// OAuth client id.
    pub client_id: String,

    /// OAuth client secret (keep confidential).
    pub client_secret: String,

    /// Callback URL registered with the GitHub application.
    pub redirect_uri: String,

    /// Requested scopes.
    ///
    /// Default: `read:user user:email`
    pub scopes: Vec<String>,
}

impl GitHubConfig {
    /// Create new GitHub configuration with the default scopes.
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            scopes: default_scopes(),
        }
    }

    /// Set custom scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Read `GITHUB_CLIENT_ID`, `GITHUB_CLIENT_SECRET` and
    /// `GITHUB_REDIRECT_URI`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AuthError::Configuration(key.to_string()))
        };

        Ok(Self::new(
            required(ENV_GITHUB_CLIENT_ID)?,
            required(ENV_GITHUB_CLIENT_SECRET)?,
            required(ENV_GITHUB_REDIRECT_URI)?,
        ))
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:3000/auth/github/callback".to_string(),
            scopes: default_scopes(),
        }
    }
}

fn default_scopes() -> Vec<String> {
    vec!["read:user".to_string(), "user:email".to_string()]
}

/// Identity service configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of an issued session token.
    ///
    /// Default: 7 days
    pub token_lifetime: Duration,

    /// How long an issued OAuth state stays redeemable.
    ///
    /// Default: 10 minutes
    pub state_ttl: Duration,
}

impl AuthConfig {
    /// Create configuration with default lifetimes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            token_lifetime: Duration::hours(24 * 7),
            state_ttl: Duration::minutes(10),
        }
    }

    /// Set session token lifetime.
    #[must_use]
    pub const fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Set OAuth state TTL.
    #[must_use]
    pub const fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = ttl;
        self
    }

    /// Defaults, overridden by `AUTH_TOKEN_LIFETIME_HOURS` and
    /// `OAUTH_STATE_TTL_MINUTES` when set.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if a set variable is not a positive
    /// integer or names a span too large to add to the current time.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(lifetime) = parse_duration(&lookup, ENV_TOKEN_LIFETIME_HOURS, Duration::try_hours)? {
            config.token_lifetime = lifetime;
        }
        if let Some(ttl) = parse_duration(&lookup, ENV_STATE_TTL_MINUTES, Duration::try_minutes)? {
            config.state_ttl = ttl;
        }

        Ok(config)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a positive count of `unit`s. The resulting span must be
/// representable and must not push `now` past the supported date range.
fn parse_duration(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    unit: fn(i64) -> Option<Duration>,
) -> Result<Option<Duration>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|value| *value > 0)
        .and_then(unit)
        .filter(|span| Utc::now().checked_add_signed(*span).is_some())
        .map(Some)
        .ok_or_else(|| AuthError::Configuration(key.to_string()))
}
