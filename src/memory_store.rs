use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::Account;
use crate::models::entry::JournalEntry;
use crate::store::{AccountStore, EntryStore};
use crate::util::now_millis;

/// In-memory entry store. Keeps the same contract as the SQLite store; used
/// by service unit tests and useful for running the server without a file.
#[derive(Default)]
pub struct MemoryEntryStore {
    entries: Mutex<HashMap<String, JournalEntry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, JournalEntry>>, AppError> {
        self.entries
            .lock()
            .map_err(|e| AppError::invalid_op("entry store lock", e))
    }
}

#[async_trait]
impl EntryStore for MemoryEntryStore {
    async fn put(&self, mut entry: JournalEntry) -> Result<JournalEntry, AppError> {
        if entry.date_created.is_none() || entry.date_modified.is_none() {
            return Err(AppError::invalid_op("entry put", "timestamps not set"));
        }
        let id = entry
            .id
            .take()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        entry.id = Some(id.clone());
        self.guard()?.insert(id, entry.clone());
        Ok(entry)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<JournalEntry>, AppError> {
        Ok(self.guard()?.get(id).cloned())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        self.guard()?.remove(id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<JournalEntry>, AppError> {
        let mut all: Vec<_> = self.guard()?.values().cloned().collect();
        all.sort_by_key(|e| e.date_created);
        Ok(all)
    }
}

/// In-memory account store keyed by username, which gives the uniqueness
/// constraint for free.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<String, Account>>, AppError> {
        self.accounts
            .lock()
            .map_err(|e| AppError::invalid_op("account store lock", e))
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn put(&self, mut account: Account) -> Result<Account, AppError> {
        let mut accounts = self.guard()?;
        match account.id.take() {
            Some(id) => {
                account.id = Some(id);
            }
            None => {
                if accounts.contains_key(&account.username) {
                    return Err(AppError::Conflict(format!(
                        "username '{}' already exists",
                        account.username
                    )));
                }
                account.id = Some(Uuid::new_v4().to_string());
                account.created_at = now_millis();
            }
        }
        accounts.insert(account.username.clone(), account.clone());
        Ok(account)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        Ok(self.guard()?.get(username).cloned())
    }

    async fn delete_by_username(&self, username: &str) -> Result<u64, AppError> {
        Ok(self.guard()?.remove(username).map_or(0, |_| 1))
    }

    async fn list_all(&self) -> Result<Vec<Account>, AppError> {
        let mut all: Vec<_> = self.guard()?.values().cloned().collect();
        all.sort_by_key(|a| a.created_at);
        Ok(all)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
