use async_trait::async_trait;

use crate::error::AppError;
use crate::models::account::Account;
use crate::models::entry::JournalEntry;

/// Key-value persistence for journal entries. Assigns identifiers on first
/// put; persists timestamps exactly as given (the journal service owns them).
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn put(&self, entry: JournalEntry) -> Result<JournalEntry, AppError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<JournalEntry>, AppError>;
    /// No-op when the id is absent.
    async fn delete_by_id(&self, id: &str) -> Result<(), AppError>;
    async fn list_all(&self) -> Result<Vec<JournalEntry>, AppError>;
}

/// Key-value persistence for accounts, with username uniqueness enforced at
/// the store level.
///
/// The entry store and the account store are independent persistence units:
/// no operation spans both in one transaction, so the dual-write protocols in
/// the journal service carry a documented crash window between the two puts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn put(&self, account: Account) -> Result<Account, AppError>;
    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, AppError>;
    /// Returns the number of accounts removed (0 or 1).
    async fn delete_by_username(&self, username: &str) -> Result<u64, AppError>;
    async fn list_all(&self) -> Result<Vec<Account>, AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}
