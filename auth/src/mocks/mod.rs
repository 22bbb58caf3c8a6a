//! In-memory collaborator implementations for testing.
//!
//! Available with the `test-utils` feature (on by default). Every mock is
//! cheap to clone; clones share storage.

pub mod account;
pub mod identity;
pub mod user;

pub use account::MockAccountRepository;
pub use identity::MockIdentityProvider;
pub use user::MockUserRepository;
