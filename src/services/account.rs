use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AppError;
use crate::models::account::{Account, AccountDto, RegisterRequest, Role};
use crate::store::AccountStore;

/// Account lifecycle and the authoritative owned-entries list. The journal
/// service goes through `save_account` for every list reconciliation; nothing
/// else writes accounts.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::invalid_op("password hashing", e))
    }

    /// Constant-shape check: a malformed stored hash verifies as false rather
    /// than erroring, so the caller cannot learn anything about the account.
    pub fn verify_password(account: &Account, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&account.password_hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    async fn register(
        &self,
        request: RegisterRequest,
        roles: Vec<Role>,
    ) -> Result<AccountDto, AppError> {
        request.validate().map_err(AppError::Validation)?;
        tracing::info!(username = %request.username, ?roles, "Registering account");

        let account = Account {
            id: None,
            username: request.username,
            password_hash: Self::hash_password(&request.password)?,
            roles,
            entry_ids: Vec::new(),
            created_at: 0,
        };
        let saved = self.store.put(account).await?;
        Ok(saved.to_dto())
    }

    pub async fn register_user(&self, request: RegisterRequest) -> Result<AccountDto, AppError> {
        self.register(request, vec![Role::User]).await
    }

    pub async fn register_admin(&self, request: RegisterRequest) -> Result<AccountDto, AppError> {
        self.register(request, vec![Role::Admin, Role::User]).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        self.store.get_by_username(username).await
    }

    /// Owned entries are not cascade-deleted; they stay in the entry store as
    /// orphans (observed behavior of the system this replaces).
    pub async fn delete_by_username(&self, username: &str) -> Result<bool, AppError> {
        tracing::info!(username = %username, "Deleting account");
        let removed = self.store.delete_by_username(username).await?;
        Ok(removed > 0)
    }

    /// Persist a full account snapshot, preserving every field the caller did
    /// not change.
    pub async fn save_account(&self, account: Account) -> Result<Account, AppError> {
        self.store.put(account).await
    }

    pub async fn change_password(&self, username: &str, password: &str) -> Result<(), AppError> {
        tracing::info!(username = %username, "Changing password");
        let mut account = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(format!("no account '{username}'")))?;
        account.password_hash = Self::hash_password(password)?;
        self.store.put(account).await?;
        Ok(())
    }

    pub async fn list_all(&self) -> Result<Vec<AccountDto>, AppError> {
        let accounts = self.store.list_all().await?;
        if accounts.is_empty() {
            tracing::warn!("No accounts in the store");
        }
        Ok(accounts.iter().map(Account::to_dto).collect())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryAccountStore;

    fn service() -> AccountService {
        AccountService::new(Arc::new(MemoryAccountStore::new()))
    }

    fn request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: "correct horse".into(),
        }
    }

    #[tokio::test]
    async fn register_user_gets_user_role_only() {
        let svc = service();
        let dto = svc.register_user(request("alice")).await.unwrap();
        assert_eq!(dto.roles, vec![Role::User]);
        assert!(dto.id.is_some());
        assert!(dto.entry_ids.is_empty());
    }

    #[tokio::test]
    async fn register_admin_gets_both_roles() {
        let svc = service();
        let dto = svc.register_admin(request("root")).await.unwrap();
        assert_eq!(dto.roles, vec![Role::Admin, Role::User]);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let svc = service();
        svc.register_user(request("alice")).await.unwrap();
        let err = svc.register_user(request("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn password_is_hashed_and_verifiable() {
        let svc = service();
        svc.register_user(request("alice")).await.unwrap();
        let account = svc.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(account.password_hash, "correct horse");
        assert!(AccountService::verify_password(&account, "correct horse"));
        assert!(!AccountService::verify_password(&account, "wrong horse"));
    }

    #[tokio::test]
    async fn change_password_invalidates_old_credential() {
        let svc = service();
        svc.register_user(request("alice")).await.unwrap();
        svc.change_password("alice", "new password").await.unwrap();
        let account = svc.find_by_username("alice").await.unwrap().unwrap();
        assert!(!AccountService::verify_password(&account, "correct horse"));
        assert!(AccountService::verify_password(&account, "new password"));
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let svc = service();
        svc.register_user(request("alice")).await.unwrap();
        assert!(svc.delete_by_username("alice").await.unwrap());
        assert!(!svc.delete_by_username("alice").await.unwrap());
    }
}
