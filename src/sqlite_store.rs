use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::account::{Account, Role};
use crate::models::entry::JournalEntry;
use crate::store::{AccountStore, EntryStore};
use crate::util::now_millis;

pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

type EntryRow = (String, String, String, i64, i64);

fn row_to_entry((id, title, content, date_created, date_modified): EntryRow) -> JournalEntry {
    JournalEntry {
        id: Some(id),
        title,
        content,
        date_created: Some(date_created),
        date_modified: Some(date_modified),
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn put(&self, mut entry: JournalEntry) -> Result<JournalEntry, AppError> {
        let id = match entry.id.take() {
            Some(id) => id,
            None => Uuid::new_v4().to_string(),
        };
        tracing::debug!(entry_id = %id, "db: UPSERT entries");

        let date_created = entry
            .date_created
            .ok_or_else(|| AppError::invalid_op("entry put", "dateCreated not set"))?;
        let date_modified = entry
            .date_modified
            .ok_or_else(|| AppError::invalid_op("entry put", "dateModified not set"))?;

        sqlx::query(
            "INSERT INTO entries (id, title, content, date_created, date_modified)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
               title = excluded.title,
               content = excluded.content,
               date_created = excluded.date_created,
               date_modified = excluded.date_modified",
        )
        .bind(&id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(date_created)
        .bind(date_modified)
        .execute(&self.pool)
        .await?;

        tracing::debug!(entry_id = %id, "db: entry row written");

        entry.id = Some(id);
        Ok(entry)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<JournalEntry>, AppError> {
        tracing::debug!(entry_id = %id, "db: SELECT entry");

        let row: Option<EntryRow> = sqlx::query_as(
            "SELECT id, title, content, date_created, date_modified FROM entries WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        tracing::debug!(entry_id = %id, found = row.is_some(), "db: entry lookup result");

        Ok(row.map(row_to_entry))
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            entry_id = %id,
            rows_affected = result.rows_affected(),
            "db: entry delete result"
        );

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<JournalEntry>, AppError> {
        tracing::debug!("db: SELECT all entries");

        let rows: Vec<EntryRow> = sqlx::query_as(
            "SELECT id, title, content, date_created, date_modified FROM entries ORDER BY date_created",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }
}

pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

type AccountRow = (String, String, String, String, String, i64);

fn row_to_account(
    (id, username, password_hash, roles, entry_ids, created_at): AccountRow,
) -> Result<Account, AppError> {
    let roles: Vec<Role> = serde_json::from_str(&roles)
        .map_err(|e| AppError::invalid_op("account roles decode", e))?;
    let entry_ids: Vec<String> = serde_json::from_str(&entry_ids)
        .map_err(|e| AppError::invalid_op("account entry_ids decode", e))?;
    Ok(Account {
        id: Some(id),
        username,
        password_hash,
        roles,
        entry_ids,
        created_at,
    })
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn put(&self, mut account: Account) -> Result<Account, AppError> {
        let id = match account.id.take() {
            Some(id) => id,
            None => {
                account.created_at = now_millis();
                Uuid::new_v4().to_string()
            }
        };
        tracing::debug!(username = %account.username, "db: UPSERT accounts");

        let roles = serde_json::to_string(&account.roles)
            .map_err(|e| AppError::invalid_op("account roles encode", e))?;
        let entry_ids = serde_json::to_string(&account.entry_ids)
            .map_err(|e| AppError::invalid_op("account entry_ids encode", e))?;

        let result = sqlx::query(
            "INSERT INTO accounts (id, username, password_hash, roles, entry_ids, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
               password_hash = excluded.password_hash,
               roles = excluded.roles,
               entry_ids = excluded.entry_ids",
        )
        .bind(&id)
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&roles)
        .bind(&entry_ids)
        .bind(account.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(username = %account.username, "db: account row written");
                account.id = Some(id);
                Ok(account)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Conflict(format!(
                    "username '{}' already exists",
                    account.username
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        tracing::debug!(username = %username, "db: SELECT account");

        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, password_hash, roles, entry_ids, created_at
             FROM accounts WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        tracing::debug!(username = %username, found = row.is_some(), "db: account lookup result");

        row.map(row_to_account).transpose()
    }

    async fn delete_by_username(&self, username: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            username = %username,
            rows_affected = result.rows_affected(),
            "db: account delete result"
        );

        Ok(result.rows_affected())
    }

    async fn list_all(&self) -> Result<Vec<Account>, AppError> {
        tracing::debug!("db: SELECT all accounts");

        let rows: Vec<AccountRow> = sqlx::query_as(
            "SELECT id, username, password_hash, roles, entry_ids, created_at
             FROM accounts ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_account).collect()
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
