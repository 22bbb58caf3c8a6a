//! Password hashing and verification.
//!
//! Passwords are hashed with Argon2id using a fresh random salt per hash.
//! Only the PHC-formatted hash string is ever stored.

use crate::error::{AuthError, Result};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash as PhcHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static DUMMY_HASH: OnceLock<Option<PasswordHash>> = OnceLock::new();

#[cfg(test)]
thread_local! {
    static VERIFICATIONS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of Argon2 verifications run on the current thread.
#[cfg(test)]
pub(crate) fn verifications() -> usize {
    VERIFICATIONS.with(std::cell::Cell::get)
}

/// Salted Argon2 hash of a user's password, in PHC string format.
///
/// `Debug` is redacted so hashes never end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a plaintext password.
    ///
    /// Length rules are enforced by the caller (see
    /// [`crate::utils::validate_password`]).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the hasher fails, which only
    /// happens on invalid Argon2 parameters.
    pub fn new(plaintext: &str) -> Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))?;

        Ok(Self(hash.to_string()))
    }

    /// Wrap a hash previously produced by [`PasswordHash::new`].
    #[must_use]
    pub const fn from_phc(phc: String) -> Self {
        Self(phc)
    }

    /// The PHC string, for persistence.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a plaintext password against this hash.
    ///
    /// Comparison is constant-time inside Argon2. Every failure, including a
    /// corrupt stored hash, collapses into `AuthError::InvalidCredentials`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the password does not match.
    pub fn verify(&self, plaintext: &str) -> Result<()> {
        #[cfg(test)]
        VERIFICATIONS.with(|count| count.set(count.get() + 1));

        let parsed = PhcHash::new(&self.0).map_err(|e| {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            AuthError::InvalidCredentials
        })?;

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Verify `plaintext` against a fixed hash and discard the outcome.
    ///
    /// Login paths call this when there is no stored hash to check, so an
    /// unknown account or email costs the same Argon2 work as a wrong
    /// password.
    pub fn verify_dummy(plaintext: &str) {
        let dummy = DUMMY_HASH.get_or_init(|| PasswordHash::new("tenant-directory-dummy").ok());
        if let Some(hash) = dummy {
            let _ = hash.verify(plaintext);
        }
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}
