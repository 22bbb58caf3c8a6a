//! Utility functions for input validation and name handling.

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{AuthError, Result};

/// Validate email address format.
///
/// This performs basic RFC 5322 validation:
/// - Must contain exactly one `@`
/// - Must have non-empty local and domain parts
/// - Length must be between 3 and 255 characters
///
/// # Examples
///
/// ```
/// use tenant_directory_auth::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// assert!(!is_valid_email("user@"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain must contain at least one dot
    if !domain.contains('.') {
        return false;
    }

    let valid_local_chars =
        |c: char| c.is_alphanumeric() || c == '.' || c == '-' || c == '+' || c == '_';

    let valid_domain_chars = |c: char| c.is_alphanumeric() || c == '.' || c == '-';

    if !local.chars().all(valid_local_chars) || !domain.chars().all(valid_domain_chars) {
        return false;
    }

    // Domain parts between dots must be non-empty
    domain.split('.').all(|part| !part.is_empty())
}

/// Validate an email, naming the field on failure.
///
/// # Errors
///
/// Returns `AuthError::Validation` for field `email`.
pub fn validate_email(email: &str) -> Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AuthError::validation("email", "not a valid email address"))
    }
}

/// Validate plaintext password length.
///
/// # Errors
///
/// Returns `AuthError::Validation` for field `password`.
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        ));
    }
    Ok(())
}

/// Split a display name into given and family name.
///
/// The first whitespace-separated token is the given name, the last is the
/// family name. A single-word name yields the same word for both.
///
/// # Examples
///
/// ```
/// use tenant_directory_auth::utils::split_display_name;
///
/// assert_eq!(
///     split_display_name("Ada King Lovelace"),
///     Some(("Ada".to_string(), "Lovelace".to_string()))
/// );
/// assert_eq!(split_display_name("   "), None);
/// ```
#[must_use]
pub fn split_display_name(name: &str) -> Option<(String, String)> {
    let mut parts = name.split_whitespace();
    let first = parts.next()?;
    let last = parts.last().unwrap_or(first);
    Some((first.to_string(), last.to_string()))
}

/// Treat empty or whitespace-only strings as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@example.com"));
        assert!(is_valid_email("user+tag@example.com"));
        assert!(is_valid_email("user_name@subdomain.example.com"));
        assert!(is_valid_email("user-name@example.co.uk"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email("user@example..com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn test_email_length_limits() {
        assert!(!is_valid_email("a@"));
        assert!(is_valid_email("a@b.c"));

        let long_email = format!("{}@example.com", "a".repeat(250));
        assert!(!is_valid_email(&long_email));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("massa123").is_ok());
        assert_eq!(
            validate_password("short"),
            Err(AuthError::validation("password", "must be at least 8 characters"))
        );
    }

    #[test]
    fn test_split_display_name() {
        assert_eq!(
            split_display_name("Grace Hopper"),
            Some(("Grace".to_string(), "Hopper".to_string()))
        );
        assert_eq!(
            split_display_name("Prince"),
            Some(("Prince".to_string(), "Prince".to_string()))
        );
        assert_eq!(split_display_name(""), None);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("x")), Some("x"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
