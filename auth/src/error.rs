//! Error types for authentication and authorization operations.

use thiserror::Error;

/// Result type alias for directory operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the account directory.
///
/// Messages are safe to show to callers: they never contain tokens,
/// password hashes, or which part of a credential triple was wrong.
/// Internal detail goes to the logs, not into these variants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════

    /// Malformed input.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What was wrong with it.
        message: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Bad account code, email or password. Deliberately ambiguous.
    #[error("invalid account, email or password")]
    InvalidCredentials,

    /// Bearer token missing, malformed or unknown.
    #[error("token invalid")]
    TokenInvalid,

    /// Bearer token matched but its lifetime has passed.
    #[error("token expired")]
    TokenExpired,

    /// Token belongs to a different account than the one addressed.
    #[error("account invalid")]
    AccountMismatch,

    /// OAuth state missing, malformed, expired or replayed.
    #[error("invalid oauth state")]
    InvalidState,

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// Role does not allow the requested action.
    #[error("access denied")]
    AccessDenied,

    /// Requested record not found.
    #[error("resource not found")]
    ResourceNotFound,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// OAuth code exchange or profile fetch failed.
    #[error("external provider error: {0}")]
    ExternalProvider(String),

    /// Storage operation failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Required configuration value missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal failure (should not be exposed to users).
    #[error("internal error")]
    Internal(String),
}

impl AuthError {
    /// Shorthand for a [`AuthError::Validation`] error.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tenant_directory_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::Persistence("down".into()).is_user_error());
    /// ```
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidCredentials
                | Self::TokenInvalid
                | Self::TokenExpired
                | Self::AccountMismatch
                | Self::InvalidState
                | Self::AccessDenied
                | Self::ResourceNotFound
        )
    }

    /// Returns `true` if this error indicates a security issue.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tenant_directory_auth::AuthError;
    /// assert!(AuthError::InvalidState.is_security_issue());
    /// assert!(!AuthError::TokenExpired.is_security_issue());
    /// ```
    pub const fn is_security_issue(&self) -> bool {
        matches!(
            self,
            Self::InvalidState | Self::AccountMismatch | Self::AccessDenied
        )
    }

    /// HTTP status equivalent for the transport layer.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::InvalidCredentials
            | Self::TokenInvalid
            | Self::TokenExpired
            | Self::InvalidState => 401,
            Self::AccessDenied | Self::AccountMismatch => 403,
            Self::ResourceNotFound => 404,
            Self::ExternalProvider(_) => 502,
            Self::Persistence(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }
}
