//! Collaborator interfaces.
//!
//! The identity service depends only on these traits. Persistence and the
//! external identity provider are injected, so use cases run unchanged over
//! a database, an HTTP provider, or the in-memory doubles in
//! [`crate::mocks`].
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────────┐
//! │ IdentityService  │────▶│ AccountRepository  │
//! │                  │────▶│ UserRepository     │
//! │                  │────▶│ IdentityProvider   │──▶ GitHub
//! └──────────────────┘     └────────────────────┘
//! ```
//!
//! Lookups that miss return `AuthError::ResourceNotFound`; use cases
//! translate it into the domain error appropriate for the flow.

pub mod account;
pub mod github;
pub mod identity;
pub mod user;

pub use account::AccountRepository;
pub use github::GitHubProvider;
pub use identity::{ExternalProfile, IdentityProvider};
pub use user::{Page, UserRepository};
