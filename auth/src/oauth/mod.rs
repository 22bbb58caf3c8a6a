//! OAuth anti-CSRF state.
//!
//! An [`OAuthState`] carries the flow intent (login or signup) through the
//! identity provider's redirect. The [`OAuthStateManager`] remembers which
//! state codes are outstanding so each one is redeemed at most once.
//!
//! ```text
//!   issue()                      consume()
//! ──────────▶ issued ──────────────────────────▶ consumed
//!               │
//!               │ unknown / replayed / older than TTL
//!               └──────────────────────────────▶ rejected (InvalidState)
//! ```

pub mod manager;
pub mod state;

pub use manager::OAuthStateManager;
pub use state::{OAuthIntent, OAuthState};
