//! Opaque token generation.
//!
//! All randomness comes from the operating system CSPRNG. A failing OS
//! random source aborts the request with a panic inside `rand`; there is no
//! fallback to a weaker generator.

use crate::constants::SESSION_TOKEN_LENGTH;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;

/// Generate a session bearer token.
///
/// 45 random bytes encode to exactly 60 URL-safe base64 characters, which
/// are valid in an `Authorization: Bearer` header without escaping.
///
/// # Examples
///
/// ```
/// use tenant_directory_auth::token::new_session_token;
///
/// let token = new_session_token();
/// assert_eq!(token.len(), 60);
/// ```
#[must_use]
pub fn new_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_LENGTH * 3 / 4];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a hex-encoded random code of exactly `length` characters.
///
/// Used for OAuth state codes and for the throwaway passwords of
/// OAuth-only users.
///
/// # Examples
///
/// ```
/// use tenant_directory_auth::token::new_opaque_code;
///
/// let code = new_opaque_code(17);
/// assert_eq!(code.len(), 17);
/// assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn new_opaque_code(length: usize) -> String {
    let mut bytes = vec![0u8; length.div_ceil(2)];
    OsRng.fill_bytes(&mut bytes);
    let mut code = hex::encode(bytes);
    code.truncate(length);
    code
}
