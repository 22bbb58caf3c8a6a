//! Outstanding OAuth state tracking.

use crate::constants::OAUTH_STATE_CODE_LENGTH;
use crate::error::{AuthError, Result};
use crate::oauth::state::{OAuthIntent, OAuthState};
use crate::token::new_opaque_code;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Issues OAuth states and redeems each of them at most once.
///
/// Only the random code is tracked; the payload travels inside the state
/// string. Clones share the same outstanding set, so construct one manager
/// per process and hand clones to whoever needs it.
#[derive(Debug, Clone)]
pub struct OAuthStateManager {
    outstanding: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
    ttl: Duration,
}

impl OAuthStateManager {
    /// Create a manager whose states expire `ttl` after issuance.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            outstanding: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Configured state lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a fresh state for `intent` and record its code as outstanding.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the outstanding set is poisoned.
    pub fn issue(&self, intent: OAuthIntent) -> Result<OAuthState> {
        let code = new_opaque_code(OAUTH_STATE_CODE_LENGTH);
        self.lock()?.insert(code.clone(), Utc::now());

        tracing::debug!(intent = intent.kind(), "issued oauth state");
        Ok(OAuthState { intent, code })
    }

    /// Parse a state string and redeem its code.
    ///
    /// Lookup and removal happen under one lock, so of several concurrent
    /// callers presenting the same state exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidState` if the string is malformed, the code
    /// is unknown or already redeemed, or the state outlived its TTL.
    pub fn consume(&self, raw: &str) -> Result<OAuthState> {
        let state = OAuthState::parse(raw)?;

        let issued_at = self.lock()?.remove(&state.code).ok_or_else(|| {
            tracing::warn!(intent = state.intent.kind(), "unknown or replayed oauth state");
            AuthError::InvalidState
        })?;

        if Utc::now() - issued_at >= self.ttl {
            tracing::warn!(
                intent = state.intent.kind(),
                issued_at = %issued_at,
                "expired oauth state"
            );
            return Err(AuthError::InvalidState);
        }

        Ok(state)
    }

    /// Drop every state older than the TTL. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the outstanding set is poisoned.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut outstanding = self.lock()?;
        let before = outstanding.len();
        outstanding.retain(|_, issued_at| now - *issued_at < self.ttl);
        let purged = before - outstanding.len();

        if purged > 0 {
            tracing::debug!(purged, "purged expired oauth states");
        }
        Ok(purged)
    }

    /// Number of states issued but not yet redeemed or purged.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the outstanding set is poisoned.
    pub fn outstanding(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, DateTime<Utc>>>> {
        self.outstanding
            .lock()
            .map_err(|_| AuthError::Internal("oauth state lock poisoned".to_string()))
    }

    #[cfg(test)]
    fn backdate(&self, code: &str, by: Duration) {
        if let Ok(mut outstanding) = self.outstanding.lock() {
            if let Some(issued_at) = outstanding.get_mut(code) {
                *issued_at -= by;
            }
        }
    }
}

impl Default for OAuthStateManager {
    fn default() -> Self {
        Self::new(Duration::minutes(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_intent() -> OAuthIntent {
        OAuthIntent::Login {
            account_code: Some("acme-inc".to_string()),
        }
    }

    #[test]
    fn test_issue_and_consume() {
        let manager = OAuthStateManager::default();
        let state = manager.issue(login_intent()).unwrap();
        assert_eq!(state.code.len(), OAUTH_STATE_CODE_LENGTH);
        assert_eq!(manager.outstanding().unwrap(), 1);

        let consumed = manager.consume(&state.to_string()).unwrap();
        assert_eq!(consumed, state);
        assert_eq!(manager.outstanding().unwrap(), 0);
    }

    #[test]
    fn test_replay_is_rejected() {
        let manager = OAuthStateManager::default();
        let raw = manager.issue(login_intent()).unwrap().to_string();

        assert!(manager.consume(&raw).is_ok());
        assert_eq!(manager.consume(&raw), Err(AuthError::InvalidState));
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let manager = OAuthStateManager::default();
        let forged = OAuthState {
            intent: login_intent(),
            code: "0123456789abcdef".to_string(),
        };
        assert_eq!(manager.consume(&forged.to_string()), Err(AuthError::InvalidState));
    }

    #[test]
    fn test_tampered_payload_still_needs_known_code() {
        let manager = OAuthStateManager::default();
        let state = manager.issue(login_intent()).unwrap();
        let tampered = OAuthState {
            intent: OAuthIntent::Login {
                account_code: Some("other-co".to_string()),
            },
            code: state.code.clone(),
        };

        // The code is what is tracked, so the first redemption wins either way.
        assert!(manager.consume(&tampered.to_string()).is_ok());
        assert_eq!(manager.consume(&state.to_string()), Err(AuthError::InvalidState));
    }

    #[test]
    fn test_expired_state_is_rejected_and_removed() {
        let manager = OAuthStateManager::new(Duration::minutes(10));
        let state = manager.issue(login_intent()).unwrap();
        manager.backdate(&state.code, Duration::minutes(11));

        assert_eq!(manager.consume(&state.to_string()), Err(AuthError::InvalidState));
        assert_eq!(manager.outstanding().unwrap(), 0);
    }

    #[test]
    fn test_purge_expired() {
        let manager = OAuthStateManager::new(Duration::minutes(10));
        let stale = manager.issue(login_intent()).unwrap();
        let fresh = manager.issue(login_intent()).unwrap();
        manager.backdate(&stale.code, Duration::minutes(30));

        assert_eq!(manager.purge_expired().unwrap(), 1);
        assert_eq!(manager.outstanding().unwrap(), 1);
        assert!(manager.consume(&fresh.to_string()).is_ok());
    }

    #[test]
    fn test_clones_share_outstanding_set() {
        let manager = OAuthStateManager::default();
        let other = manager.clone();
        let raw = manager.issue(login_intent()).unwrap().to_string();

        assert!(other.consume(&raw).is_ok());
        assert_eq!(manager.consume(&raw), Err(AuthError::InvalidState));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consume_single_winner() {
        let manager = OAuthStateManager::default();
        let raw = manager.issue(login_intent()).unwrap().to_string();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let manager = manager.clone();
                let raw = raw.clone();
                tokio::spawn(async move { manager.consume(&raw) })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert_eq!(e, AuthError::InvalidState),
            }
        }
        assert_eq!(successes, 1);
    }
}
