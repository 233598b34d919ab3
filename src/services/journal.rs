use std::sync::Arc;

use crate::error::AppError;
use crate::models::account::Account;
use crate::models::entry::{EntryDto, JournalEntry};
use crate::services::account::AccountService;
use crate::store::EntryStore;
use crate::util::now_millis;

/// Sole entry point for journal entry creation, retrieval, update and
/// deletion. Every write runs the two-store protocol: entry store first, then
/// the owning account's entry_ids list through the account service. The two
/// stores share no transaction, so a crash between the writes can leave an
/// orphaned entry (create/update) or a leaked one (delete); neither leaves a
/// dangling reference in an account.
#[derive(Clone)]
pub struct JournalService {
    entries: Arc<dyn EntryStore>,
    accounts: AccountService,
}

impl JournalService {
    pub fn new(entries: Arc<dyn EntryStore>, accounts: AccountService) -> Self {
        Self { entries, accounts }
    }

    /// All entries across all accounts, for administrative use.
    pub async fn list_all(&self) -> Result<Vec<JournalEntry>, AppError> {
        self.entries.list_all().await
    }

    /// Direct store lookup with no ownership check. Callers confirm the id is
    /// in the requesting account's entry_ids list before calling this, so an
    /// unowned entry and a missing one are indistinguishable.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<JournalEntry>, AppError> {
        self.entries.get_by_id(id).await
    }

    /// Create (no id in the dto) or merge-update (id present) an entry owned
    /// by `caller_username`, then reconcile the account's owned-entries list.
    pub async fn save(&self, dto: &EntryDto, caller_username: &str) -> Result<EntryDto, AppError> {
        dto.validate().map_err(AppError::Validation)?;
        tracing::info!(
            username = %caller_username,
            entry_id = ?dto.id,
            "Saving journal entry"
        );

        let mut account = self
            .accounts
            .find_by_username(caller_username)
            .await?
            .ok_or_else(|| {
                AppError::AccountNotFound(format!("no account '{caller_username}'"))
            })?;

        let mut entry = dto.to_entry();
        let now = now_millis();
        match entry.id.as_deref() {
            None => {
                entry.date_created = Some(now);
            }
            Some(id) => {
                // Recover the original creation timestamp from the store;
                // the client-supplied one is never trusted.
                let existing = self
                    .entries
                    .get_by_id(id)
                    .await
                    .map_err(|e| AppError::invalid_op("save journal entry: lookup existing", e))?;
                match existing {
                    Some(stored) => {
                        entry.date_created = stored.date_created;
                        if dto.content.is_none() {
                            entry.content = stored.content;
                        }
                    }
                    None => {
                        entry.date_created = Some(now);
                    }
                }
            }
        }
        entry.date_modified = Some(now);

        let saved = self
            .entries
            .put(entry)
            .await
            .map_err(|e| AppError::invalid_op("save journal entry: entry put", e))?;
        let saved_id = saved
            .id
            .clone()
            .ok_or_else(|| AppError::invalid_op("save journal entry", "store returned no id"))?;

        // Reconcile the owned list. The list holds identities by value, so an
        // already-present id keeps its position and nothing is appended.
        if !account.entry_ids.iter().any(|id| id == &saved_id) {
            account.entry_ids.push(saved_id.clone());
        }
        self.accounts
            .save_account(account)
            .await
            .map_err(|e| AppError::invalid_op("save journal entry: account put", e))?;

        tracing::info!(username = %caller_username, entry_id = %saved_id, "Journal entry saved");
        Ok(saved.to_dto())
    }

    /// Delete an entry owned by `caller_username`. Returns false, touching
    /// nothing, when the id is not in the caller's owned list; retrying a
    /// successful delete therefore also returns false.
    pub async fn delete_by_id(&self, id: &str, caller_username: &str) -> Result<bool, AppError> {
        let mut account = self
            .accounts
            .find_by_username(caller_username)
            .await?
            .ok_or_else(|| {
                AppError::AccountNotFound(format!("no account '{caller_username}'"))
            })?;

        let before = account.entry_ids.len();
        account.entry_ids.retain(|owned| owned != id);
        if account.entry_ids.len() == before {
            tracing::info!(
                username = %caller_username,
                entry_id = %id,
                "Delete skipped: entry not in caller's owned list"
            );
            return Ok(false);
        }

        // Reference first, entry second: a failure after this point leaks the
        // entry in the store but never leaves a dangling reference.
        self.accounts
            .save_account(account)
            .await
            .map_err(|e| AppError::invalid_op("delete journal entry: account put", e))?;
        self.entries
            .delete_by_id(id)
            .await
            .map_err(|e| AppError::invalid_op("delete journal entry: entry delete", e))?;

        tracing::info!(username = %caller_username, entry_id = %id, "Journal entry deleted");
        Ok(true)
    }

    /// Resolve an account's owned list to entries, skipping ids whose entry
    /// is missing (the transient window of a crashed delete).
    pub async fn entries_for(&self, account: &Account) -> Result<Vec<JournalEntry>, AppError> {
        let mut entries = Vec::with_capacity(account.entry_ids.len());
        for id in &account.entry_ids {
            match self.entries.get_by_id(id).await? {
                Some(entry) => entries.push(entry),
                None => {
                    tracing::warn!(
                        username = %account.username,
                        entry_id = %id,
                        "Owned list references a missing entry"
                    );
                }
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::{MemoryAccountStore, MemoryEntryStore};
    use crate::models::account::RegisterRequest;

    async fn setup() -> (JournalService, AccountService) {
        let accounts = AccountService::new(Arc::new(MemoryAccountStore::new()));
        let journal = JournalService::new(Arc::new(MemoryEntryStore::new()), accounts.clone());
        for name in ["u1", "u2"] {
            accounts
                .register_user(RegisterRequest {
                    username: name.into(),
                    password: "long enough".into(),
                })
                .await
                .unwrap();
        }
        (journal, accounts)
    }

    fn dto(id: Option<&str>, title: &str, content: Option<&str>) -> EntryDto {
        EntryDto {
            id: id.map(Into::into),
            title: title.into(),
            content: content.map(Into::into),
            date_created: None,
            date_modified: None,
        }
    }

    async fn owned_ids(accounts: &AccountService, username: &str) -> Vec<String> {
        accounts
            .find_by_username(username)
            .await
            .unwrap()
            .unwrap()
            .entry_ids
    }

    #[tokio::test]
    async fn create_assigns_id_and_equal_timestamps() {
        let (journal, accounts) = setup().await;
        let saved = journal.save(&dto(None, "A", Some("x")), "u1").await.unwrap();

        let id = saved.id.expect("created entry has an id");
        assert!(!id.is_empty());
        assert_eq!(saved.date_created, saved.date_modified);
        assert_eq!(owned_ids(&accounts, "u1").await, vec![id]);
    }

    #[tokio::test]
    async fn update_preserves_creation_timestamp_and_unset_content() {
        let (journal, _) = setup().await;
        let first = journal.save(&dto(None, "A", Some("x")), "u1").await.unwrap();
        let id = first.id.clone().unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = journal.save(&dto(Some(&id), "B", None), "u1").await.unwrap();

        assert_eq!(second.title, "B");
        assert_eq!(second.content.as_deref(), Some("x"));
        assert_eq!(second.date_created, first.date_created);
        assert!(second.date_modified >= first.date_modified);
    }

    #[tokio::test]
    async fn client_supplied_creation_timestamp_is_ignored() {
        let (journal, _) = setup().await;
        let first = journal.save(&dto(None, "A", Some("x")), "u1").await.unwrap();
        let id = first.id.clone().unwrap();

        let mut forged = dto(Some(&id), "A", Some("x"));
        forged.date_created = Some(1);
        let second = journal.save(&forged, "u1").await.unwrap();
        assert_eq!(second.date_created, first.date_created);
    }

    #[tokio::test]
    async fn resaving_does_not_grow_the_owned_list() {
        let (journal, accounts) = setup().await;
        let saved = journal.save(&dto(None, "A", Some("x")), "u1").await.unwrap();
        let id = saved.id.unwrap();
        journal.save(&dto(Some(&id), "B", None), "u1").await.unwrap();

        assert_eq!(owned_ids(&accounts, "u1").await, vec![id]);
    }

    #[tokio::test]
    async fn delete_of_unowned_entry_returns_false_and_touches_nothing() {
        let (journal, _) = setup().await;
        let saved = journal.save(&dto(None, "A", Some("x")), "u1").await.unwrap();
        let id = saved.id.unwrap();

        assert!(!journal.delete_by_id(&id, "u2").await.unwrap());
        assert!(journal.find_by_id(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (journal, accounts) = setup().await;
        let saved = journal.save(&dto(None, "A", Some("x")), "u1").await.unwrap();
        let id = saved.id.unwrap();

        assert!(journal.delete_by_id(&id, "u1").await.unwrap());
        assert!(journal.find_by_id(&id).await.unwrap().is_none());
        assert!(owned_ids(&accounts, "u1").await.is_empty());

        assert!(!journal.delete_by_id(&id, "u1").await.unwrap());
    }

    #[tokio::test]
    async fn save_for_unknown_account_fails() {
        let (journal, _) = setup().await;
        let err = journal.save(&dto(None, "A", None), "nobody").await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn blank_title_is_a_validation_error() {
        let (journal, _) = setup().await;
        let err = journal.save(&dto(None, "  ", None), "u1").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn entries_for_skips_dangling_references() {
        let (journal, accounts) = setup().await;
        journal.save(&dto(None, "A", None), "u1").await.unwrap();
        let mut account = accounts.find_by_username("u1").await.unwrap().unwrap();
        account.entry_ids.push("gone".into());
        accounts.save_account(account).await.unwrap();

        let account = accounts.find_by_username("u1").await.unwrap().unwrap();
        let entries = journal.entries_for(&account).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "A");
    }

    #[tokio::test]
    async fn list_all_sees_every_account_entry() {
        let (journal, _) = setup().await;
        assert!(journal.list_all().await.unwrap().is_empty());
        journal.save(&dto(None, "A", None), "u1").await.unwrap();
        journal.save(&dto(None, "B", None), "u2").await.unwrap();
        assert_eq!(journal.list_all().await.unwrap().len(), 2);
    }
}
