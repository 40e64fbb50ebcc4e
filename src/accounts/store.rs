use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::accounts::error::{AccountError, AccountResult};
use crate::accounts::repo_types::{Account, AccountChanges, AccountFilter};

/// Backing collection for account records.
///
/// Implementations enforce email uniqueness. Hashing and projection happen
/// in the repository, never here.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert(&self, account: Account) -> AccountResult<Account>;
    /// Writes the fields present in `changes` to the record with `id` in a
    /// single step; untouched fields keep their stored values. `NotFound` if
    /// there is no such record.
    async fn update(&self, id: Uuid, changes: &AccountChanges) -> AccountResult<Account>;
    async fn query(&self, filter: &AccountFilter) -> AccountResult<Vec<Account>>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> AccountResult<bool>;
}

/// In-process store, insertion ordered.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: Account) -> AccountResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AccountError::DuplicateEmail(account.email));
        }
        accounts.push(account.clone());
        Ok(account)
    }

    async fn update(&self, id: Uuid, changes: &AccountChanges) -> AccountResult<Account> {
        let mut accounts = self.accounts.write().await;
        let slot = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AccountError::NotFound)?;
        changes.apply_to(slot);
        Ok(slot.clone())
    }

    async fn query(&self, filter: &AccountFilter) -> AccountResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().filter(|a| filter.matches(a)).cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> AccountResult<bool> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() != before)
    }
}
