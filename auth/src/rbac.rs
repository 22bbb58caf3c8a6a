//! Role-based access control.
//!
//! Two tiers: account admins and everyone else. The whole policy is the
//! table in [`decide`]:
//!
//! | action          | admin | member            |
//! |-----------------|-------|-------------------|
//! | `CreateUser`    | allow | deny              |
//! | `UpdateUser`    | allow | allow if self     |
//! | `UpdateAccount` | allow | deny              |
//! | `ListUsers`     | allow | own record only   |
//! | `Logout`        | allow | allow             |

use crate::error::{AuthError, Result};
use crate::state::{RoleTier, Session, UserId};

/// An account-scoped action subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Add a user to the account.
    CreateUser,
    /// Change a user's fields.
    UpdateUser {
        /// The user being changed.
        target: UserId,
    },
    /// Change the account's name or logo.
    UpdateAccount,
    /// List the account's users.
    ListUsers,
    /// Revoke the caller's own token.
    Logout,
}

/// Outcome of a policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Proceed unrestricted.
    Allow,
    /// Proceed, restricted to the caller's own record.
    AllowOwnOnly,
    /// Refuse.
    Deny,
}

/// Look up the decision for `tier` performing `action`.
///
/// `is_self` tells whether the action targets the caller's own user record.
#[must_use]
pub const fn decide(tier: RoleTier, action: Action, is_self: bool) -> Decision {
    match (tier, action) {
        (RoleTier::Admin, _) | (RoleTier::Member, Action::Logout) => Decision::Allow,
        (RoleTier::Member, Action::UpdateUser { .. }) if is_self => Decision::Allow,
        (RoleTier::Member, Action::ListUsers) => Decision::AllowOwnOnly,
        (
            RoleTier::Member,
            Action::UpdateUser { .. } | Action::CreateUser | Action::UpdateAccount,
        ) => Decision::Deny,
    }
}

/// Apply [`decide`] to an authenticated session.
///
/// # Errors
///
/// Returns `AuthError::AccessDenied` when the table says [`Decision::Deny`].
pub fn authorize(session: &Session, action: Action) -> Result<Decision> {
    let is_self = match action {
        Action::UpdateUser { target } => target == session.user_id(),
        Action::Logout => true,
        Action::CreateUser | Action::UpdateAccount | Action::ListUsers => false,
    };

    match decide(session.role().tier(), action, is_self) {
        Decision::Deny => {
            tracing::warn!(
                user_id = %session.user_id(),
                role = %session.role(),
                ?action,
                "access denied"
            );
            Err(AuthError::AccessDenied)
        }
        decision => Ok(decision),
    }
}
