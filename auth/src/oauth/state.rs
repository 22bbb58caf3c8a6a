//! OAuth state payload and its string form.

use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user wants to do once the provider sends them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OAuthIntent {
    /// Log into an existing account.
    ///
    /// Without an account code the callback lists every account linked to
    /// the external identity instead of logging in.
    Login {
        /// Account to log into.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account_code: Option<String>,
    },

    /// Create a new account with the external identity as its admin.
    Signup {
        /// Display name of the new account.
        account_name: String,
        /// Given name; falls back to the provider's display name when empty.
        #[serde(default)]
        given_name: String,
        /// Family name; falls back to the provider's display name when empty.
        #[serde(default)]
        family_name: String,
    },
}

impl OAuthIntent {
    /// Short label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Signup { .. } => "signup",
        }
    }
}

/// An issued OAuth state: intent plus the random single-use code.
///
/// The string form is compact JSON, e.g.
/// `{"type":"login","account_code":"acme-inc","code":"9f86d081884c7d65"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    /// Flow intent and its payload.
    #[serde(flatten)]
    pub intent: OAuthIntent,

    /// Random code tracked by the state manager.
    pub code: String,
}

impl OAuthState {
    /// Parse the string form produced by `to_string()`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidState` if the input is not a well-formed
    /// state.
    pub fn parse(raw: &str) -> Result<Self> {
        let state: Self = serde_json::from_str(raw).map_err(|e| {
            tracing::debug!(error = %e, "malformed oauth state");
            AuthError::InvalidState
        })?;

        if state.code.is_empty() {
            return Err(AuthError::InvalidState);
        }

        Ok(state)
    }
}

impl fmt::Display for OAuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl FromStr for OAuthState {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
