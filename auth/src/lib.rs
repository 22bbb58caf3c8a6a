//! # Tenant Directory Authentication & Authorization
//!
//! Multi-tenant account directory core: every user belongs to exactly one
//! account, authenticates with a bearer token scoped to that account, and is
//! authorized by a two-tier role model.
//!
//! ## Features
//!
//! - **Password login**: Argon2 hashes, enumeration-resistant failures
//! - **Session tokens**: 60-character opaque bearer tokens with expiry
//! - **GitHub OAuth**: single-use anti-CSRF state, identity linking, signup
//! - **RBAC**: explicit admin/member decision table
//! - **Testable**: in-memory collaborators under the `test-utils` feature
//!
//! ## Architecture
//!
//! ```text
//! Authorization header ─▶ SessionResolver ─▶ Session
//!                                               │
//!                                               ▼
//!                             rbac::authorize(session, action)
//!                                               │
//!                                               ▼
//!   IdentityService ─▶ AccountRepository / UserRepository / IdentityProvider
//! ```
//!
//! Transport and storage are out of scope: plug in implementations of the
//! traits in [`providers`].

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod account;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod providers;
pub mod rbac;
pub mod service;
pub mod session;
pub mod state;
pub mod token;
pub mod user;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use account::{Account, AccountInfo, AccountPatch};
pub use config::{AuthConfig, GitHubConfig};
pub use error::{AuthError, Result};
pub use oauth::{OAuthIntent, OAuthState, OAuthStateManager};
pub use service::{AuthResult, CreateUserArgs, IdentityService, OAuthCallbackOutcome, SignupArgs};
pub use state::{AccountId, Role, Session, UserId};
pub use user::{User, UserPatch};
