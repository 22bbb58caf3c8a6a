//! Mock account repository for testing.

use crate::account::{Account, AccountChanges};
use crate::error::{AuthError, Result};
use crate::providers::AccountRepository;
use crate::state::AccountId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mock account repository.
///
/// Uses in-memory storage and enforces code uniqueness like a unique index.
#[derive(Debug, Clone)]
pub struct MockAccountRepository {
    accounts: Arc<Mutex<HashMap<AccountId, Account>>>,
    fail_updates: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
}

impl MockAccountRepository {
    /// Create a new mock account repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            fail_updates: Arc::new(AtomicBool::new(false)),
            fail_deletes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of stored accounts (for testing).
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.lock().map_or(0, |accounts| accounts.len())
    }

    /// `true` if no account is stored (for testing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make `update_account_fields` fail with a persistence error (for testing).
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Make `delete_account` fail with a persistence error (for testing).
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> AuthError {
    AuthError::Internal("account store lock poisoned".to_string())
}

impl AccountRepository for MockAccountRepository {
    fn create_account(&self, account: &Account) -> impl Future<Output = Result<()>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let account = account.clone();

        async move {
            let mut accounts = accounts.lock().map_err(|_| poisoned())?;

            if accounts.values().any(|existing| existing.code == account.code) {
                return Err(AuthError::validation(
                    "account_name",
                    format!("account code '{}' is already taken", account.code),
                ));
            }

            accounts.insert(account.id, account);
            Ok(())
        }
    }

    fn get_account(&self, id: AccountId) -> impl Future<Output = Result<Account>> + Send {
        let accounts = Arc::clone(&self.accounts);

        async move {
            accounts
                .lock()
                .map_err(|_| poisoned())?
                .get(&id)
                .cloned()
                .ok_or(AuthError::ResourceNotFound)
        }
    }

    fn get_account_by_code(&self, code: &str) -> impl Future<Output = Result<Account>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let code = code.to_string();

        async move {
            accounts
                .lock()
                .map_err(|_| poisoned())?
                .values()
                .find(|account| account.code == code)
                .cloned()
                .ok_or(AuthError::ResourceNotFound)
        }
    }

    fn get_accounts_by_ids(
        &self,
        ids: &[AccountId],
    ) -> impl Future<Output = Result<Vec<Account>>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let ids = ids.to_vec();

        async move {
            let accounts = accounts.lock().map_err(|_| poisoned())?;
            Ok(ids
                .iter()
                .filter_map(|id| accounts.get(id).cloned())
                .collect())
        }
    }

    fn update_account_fields(
        &self,
        id: AccountId,
        changes: &AccountChanges,
    ) -> impl Future<Output = Result<Account>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let changes = changes.clone();
        let fail = self.fail_updates.load(Ordering::SeqCst);

        async move {
            if fail {
                return Err(AuthError::Persistence("update failed".to_string()));
            }

            let mut accounts = accounts.lock().map_err(|_| poisoned())?;
            let account = accounts.get_mut(&id).ok_or(AuthError::ResourceNotFound)?;
            changes.apply_to(account);
            Ok(account.clone())
        }
    }

    fn delete_account(&self, id: AccountId) -> impl Future<Output = Result<()>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let fail = self.fail_deletes.load(Ordering::SeqCst);

        async move {
            if fail {
                return Err(AuthError::Persistence("delete failed".to_string()));
            }

            accounts
                .lock()
                .map_err(|_| poisoned())?
                .remove(&id)
                .map(|_| ())
                .ok_or(AuthError::ResourceNotFound)
        }
    }
}
