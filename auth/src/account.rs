//! Account (tenant) model.

use crate::constants::MIN_ACCOUNT_CODE_LENGTH;
use crate::error::{AuthError, Result};
use crate::state::{AccountId, Role, UserId};
use crate::utils::non_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derive a kebab-case account code from a display name.
///
/// Lowercases the input, replaces every run of characters outside
/// `[a-z0-9-]` with a single `-`, then trims leading and trailing `-`.
///
/// # Examples
///
/// ```
/// use tenant_directory_auth::account::derive_code;
///
/// assert_eq!(derive_code("Acme Inc"), "acme-inc");
/// assert_eq!(derive_code("  Ölfabrik & Söhne!"), "lfabrik-s-hne");
/// ```
#[must_use]
pub fn derive_code(name: &str) -> String {
    let mut code = String::with_capacity(name.len());
    let mut in_gap = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            code.push(c);
            in_gap = false;
        } else if !in_gap {
            code.push('-');
            in_gap = true;
        }
    }

    code.trim_matches('-').to_string()
}

/// Check that a code is a well-formed account code.
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    code.len() >= MIN_ACCOUNT_CODE_LENGTH
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Account profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Logo URL.
    pub logo: String,
}

/// Role assignment of a user within an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member user id.
    pub id: UserId,

    /// Role granted in this account.
    pub role: Role,

    /// When the member was added.
    pub added_at: DateTime<Utc>,
}

/// A tenant. Owns its users and its member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,

    /// Display name.
    pub name: String,

    /// Unique kebab-case login namespace, derived from the name at creation.
    pub code: String,

    /// Profile.
    pub profile: AccountProfile,

    /// Ordered member list; at most one entry per user id.
    pub members: Vec<Member>,

    /// Owner (the signup admin).
    pub owner_id: Option<UserId>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create a new account, deriving its code from `name`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for field `account_name` if the
    /// derived code is shorter than two characters.
    pub fn new(name: &str) -> Result<Self> {
        let code = derive_code(name);
        if code.len() < MIN_ACCOUNT_CODE_LENGTH {
            return Err(AuthError::validation(
                "account_name",
                format!("could not derive a valid account code from '{name}'"),
            ));
        }

        Ok(Self {
            id: AccountId::new(),
            name: name.trim().to_string(),
            code,
            profile: AccountProfile::default(),
            members: Vec::new(),
            owner_id: None,
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Add a member, replacing any existing entry with the same id in place.
    pub fn add_member(&mut self, member: Member) {
        if let Some(existing) = self.members.iter_mut().find(|m| m.id == member.id) {
            *existing = member;
        } else {
            self.members.push(member);
        }
    }

    /// Public summary of this account.
    #[must_use]
    pub fn info(&self) -> AccountInfo {
        AccountInfo {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            logo: self.profile.logo.clone(),
        }
    }
}

/// Public account summary, listed when one external identity is linked to
/// several accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account ID.
    pub id: AccountId,

    /// Display name.
    pub name: String,

    /// Account code to log in with.
    pub code: String,

    /// Logo URL.
    pub logo: String,
}

/// Requested change to an account's mutable fields.
///
/// Absent or blank fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPatch {
    /// New display name.
    pub name: Option<String>,

    /// New logo URL.
    pub logo: Option<String>,
}

/// Field-level changes handed to persistence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountChanges {
    /// New display name.
    pub name: Option<String>,

    /// New profile.
    pub profile: Option<AccountProfile>,

    /// Replacement member list.
    pub members: Option<Vec<Member>>,
}

impl AccountChanges {
    /// Build the change set for a patch against the current account.
    #[must_use]
    pub fn from_patch(current: &Account, patch: &AccountPatch) -> Self {
        let name = non_blank(patch.name.as_deref()).map(|n| n.trim().to_string());
        let profile = non_blank(patch.logo.as_deref()).map(|logo| AccountProfile {
            logo: logo.to_string(),
            ..current.profile.clone()
        });

        Self {
            name,
            profile,
            members: None,
        }
    }

    /// `true` if nothing would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.profile.is_none() && self.members.is_none()
    }

    /// Apply these changes to an in-memory account.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(name) = &self.name {
            account.name.clone_from(name);
        }
        if let Some(profile) = &self.profile {
            account.profile = profile.clone();
        }
        if let Some(members) = &self.members {
            account.members.clone_from(members);
        }
        account.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_derive_code_examples() {
        assert_eq!(derive_code("Acme Inc"), "acme-inc");
        assert_eq!(derive_code("  --Acme__Inc--  "), "acme-inc");
        assert_eq!(derive_code("Big   Corp 2"), "big-corp-2");
        assert_eq!(derive_code("!!!"), "");
    }

    #[test]
    fn test_new_account_rejects_short_code() {
        let err = Account::new("A").unwrap_err();
        assert!(matches!(err, AuthError::Validation { field: "account_name", .. }));
        assert!(Account::new("!!").is_err());
    }

    #[test]
    fn test_new_account() {
        let account = Account::new("Acme Inc").unwrap();
        assert_eq!(account.name, "Acme Inc");
        assert_eq!(account.code, "acme-inc");
        assert!(account.members.is_empty());
        assert!(account.owner_id.is_none());
        assert!(account.updated_at.is_none());
    }

    #[test]
    fn test_add_member_overwrites_in_place() {
        let mut account = Account::new("Acme Inc").unwrap();
        let first = UserId::new();
        let second = UserId::new();

        account.add_member(Member { id: first, role: Role::Candidate, added_at: Utc::now() });
        account.add_member(Member { id: second, role: Role::Candidate, added_at: Utc::now() });
        account.add_member(Member { id: first, role: Role::Admin, added_at: Utc::now() });

        assert_eq!(account.members.len(), 2);
        assert_eq!(account.members[0].id, first);
        assert_eq!(account.members[0].role, Role::Admin);
        assert_eq!(account.members[1].id, second);
    }

    #[test]
    fn test_changes_from_patch_skip_blank_fields() {
        let account = Account::new("Acme Inc").unwrap();
        let patch = AccountPatch {
            name: Some("  ".to_string()),
            logo: None,
        };
        assert!(AccountChanges::from_patch(&account, &patch).is_empty());
    }

    #[test]
    fn test_changes_apply() {
        let mut account = Account::new("Acme Inc").unwrap();
        let patch = AccountPatch {
            name: Some("Acme Corporation".to_string()),
            logo: Some("https://cdn.example.com/acme.png".to_string()),
        };
        let changes = AccountChanges::from_patch(&account, &patch);
        changes.apply_to(&mut account);

        assert_eq!(account.name, "Acme Corporation");
        assert_eq!(account.profile.logo, "https://cdn.example.com/acme.png");
        assert_eq!(account.code, "acme-inc");
        assert!(account.updated_at.is_some());
    }

    proptest! {
        #[test]
        fn prop_derived_codes_are_kebab_case(name in "\\PC{0,40}") {
            let code = derive_code(&name);
            prop_assert!(code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!code.starts_with('-'));
            prop_assert!(!code.ends_with('-'));
        }

        #[test]
        fn prop_accepted_names_yield_valid_codes(name in "[A-Za-z0-9 _.&-]{0,30}") {
            if let Ok(account) = Account::new(&name) {
                prop_assert!(is_valid_code(&account.code));
                prop_assert_eq!(derive_code(&account.code), account.code.clone());
            }
        }
    }
}
