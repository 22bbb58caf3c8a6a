//! Mock user repository for testing.

use crate::error::{AuthError, Result};
use crate::providers::{Page, UserRepository};
use crate::state::{AccountId, UserId};
use crate::user::{User, UserChanges};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock user repository.
///
/// Keeps users in creation order and enforces email uniqueness per account.
/// Token lookups compare in constant time.
#[derive(Debug, Clone)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
    fail_creates: Arc<AtomicBool>,
}

impl MockUserRepository {
    /// Create a new mock user repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(Vec::new())),
            fail_creates: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make `create_user` fail with a persistence error (for testing).
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Overwrite the stored token expiry of a user (for testing).
    pub fn set_token_expiry(
        &self,
        account_id: AccountId,
        id: UserId,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) {
        if let Ok(mut users) = self.users.lock() {
            if let Some(user) = users
                .iter_mut()
                .find(|u| u.account_id == account_id && u.id == id)
            {
                user.token_expires_at = Some(expires_at);
            }
        }
    }

    /// Number of stored users (for testing).
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.lock().map_or(0, |users| users.len())
    }

    /// `true` if no user is stored (for testing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(users: &Mutex<Vec<User>>) -> Result<MutexGuard<'_, Vec<User>>> {
    users
        .lock()
        .map_err(|_| AuthError::Internal("user store lock poisoned".to_string()))
}

fn email_taken(users: &[User], account_id: AccountId, email: &str, except: Option<UserId>) -> bool {
    users.iter().any(|u| {
        u.account_id == account_id
            && Some(u.id) != except
            && u.email.eq_ignore_ascii_case(email)
    })
}

impl UserRepository for MockUserRepository {
    fn create_user(&self, user: &User) -> impl Future<Output = Result<()>> + Send {
        let users = Arc::clone(&self.users);
        let fail = self.fail_creates.load(Ordering::SeqCst);
        let user = user.clone();

        async move {
            if fail {
                return Err(AuthError::Persistence("insert failed".to_string()));
            }

            let mut users = lock(&users)?;
            if email_taken(&users, user.account_id, &user.email, None) {
                return Err(AuthError::validation("email", "already in use"));
            }

            users.push(user);
            Ok(())
        }
    }

    fn get_user(&self, account_id: AccountId, id: UserId) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);

        async move {
            lock(&users)?
                .iter()
                .find(|u| u.account_id == account_id && u.id == id)
                .cloned()
                .ok_or(AuthError::ResourceNotFound)
        }
    }

    fn get_user_by_email(
        &self,
        account_id: AccountId,
        email: &str,
    ) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);
        let email = email.to_string();

        async move {
            lock(&users)?
                .iter()
                .find(|u| u.account_id == account_id && u.email.eq_ignore_ascii_case(&email))
                .cloned()
                .ok_or(AuthError::ResourceNotFound)
        }
    }

    fn get_user_by_token(&self, token: &str) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);
        let token = token.to_string();

        async move {
            let users = lock(&users)?;

            // Compare against every stored token so timing does not depend on
            // where (or whether) a match is found.
            let mut found = None;
            for user in users.iter() {
                let Some(stored) = user.token.as_deref() else {
                    continue;
                };
                if constant_time_eq::constant_time_eq(stored.as_bytes(), token.as_bytes())
                    && found.is_none()
                {
                    found = Some(user.clone());
                }
            }

            found.ok_or(AuthError::ResourceNotFound)
        }
    }

    fn get_user_by_external_id(
        &self,
        account_id: AccountId,
        external_id: i64,
    ) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);

        async move {
            lock(&users)?
                .iter()
                .find(|u| u.account_id == account_id && u.profile.external_id == Some(external_id))
                .cloned()
                .ok_or(AuthError::ResourceNotFound)
        }
    }

    fn get_users_by_external_id(&self, external_id: i64) -> impl Future<Output = Result<Vec<User>>> + Send {
        let users = Arc::clone(&self.users);

        async move {
            Ok(lock(&users)?
                .iter()
                .filter(|u| u.profile.external_id == Some(external_id))
                .cloned()
                .collect())
        }
    }

    fn update_user_fields(
        &self,
        account_id: AccountId,
        id: UserId,
        changes: &UserChanges,
    ) -> impl Future<Output = Result<User>> + Send {
        let users = Arc::clone(&self.users);
        let changes = changes.clone();

        async move {
            let mut users = lock(&users)?;

            if let Some(email) = &changes.email {
                if email_taken(&users, account_id, email, Some(id)) {
                    return Err(AuthError::validation("email", "already in use"));
                }
            }

            let user = users
                .iter_mut()
                .find(|u| u.account_id == account_id && u.id == id)
                .ok_or(AuthError::ResourceNotFound)?;
            changes.apply_to(user);
            Ok(user.clone())
        }
    }

    fn delete_user(&self, account_id: AccountId, id: UserId) -> impl Future<Output = Result<()>> + Send {
        let users = Arc::clone(&self.users);

        async move {
            let mut users = lock(&users)?;
            let index = users
                .iter()
                .position(|u| u.account_id == account_id && u.id == id)
                .ok_or(AuthError::ResourceNotFound)?;
            users.remove(index);
            Ok(())
        }
    }

    fn list_users(
        &self,
        account_id: AccountId,
        only: Option<UserId>,
        page: Page,
    ) -> impl Future<Output = Result<Vec<User>>> + Send {
        let users = Arc::clone(&self.users);

        async move {
            Ok(lock(&users)?
                .iter()
                .filter(|u| u.account_id == account_id)
                .filter(|u| only.is_none_or(|id| u.id == id))
                .skip(page.offset)
                .take(page.limit)
                .cloned()
                .collect())
        }
    }
}
