//! Authentication constants.
//!
//! This module contains constant values used throughout the directory.

/// Length of a session bearer token, in characters.
pub const SESSION_TOKEN_LENGTH: usize = 60;

/// Length of the random code embedded in an OAuth state.
pub const OAUTH_STATE_CODE_LENGTH: usize = 16;

/// Length of the random password assigned to OAuth-only users.
pub const OAUTH_PASSWORD_LENGTH: usize = 20;

/// Minimum plaintext password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum length of a derived account code.
pub const MIN_ACCOUNT_CODE_LENGTH: usize = 2;

/// Shortest bearer token the session resolver will look up.
pub const MIN_BEARER_TOKEN_LENGTH: usize = 16;

/// Login method identifiers used in log fields.
pub mod login_methods {
    /// Account code, email and password.
    pub const PASSWORD: &str = "password";

    /// OAuth prefix for OAuth-based authentication.
    ///
    /// Full method format: `oauth_{provider}` (e.g., "oauth_github").
    pub const OAUTH_PREFIX: &str = "oauth_";
}
