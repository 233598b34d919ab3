use serde::{Deserialize, Serialize};

const MAX_USERNAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Role labels are a closed set so a typo can never mint an unknown grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

/// Account as held in the account store.
///
/// `entry_ids` is the denormalized owned-entries list: a value copy of the
/// identifiers this account owns, reconciled by the journal service on every
/// entry write and delete. It is the sole record of ownership.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub entry_ids: Vec<String>,
    pub created_at: i64,
}

impl Account {
    /// The credential never leaves the service layer.
    pub fn to_dto(&self) -> AccountDto {
        AccountDto {
            id: self.id.clone(),
            username: self.username.clone(),
            roles: self.roles.clone(),
            entry_ids: self.entry_ids.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    pub roles: Vec<Role>,
    pub entry_ids: Vec<String>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() {
            return Err("username must not be blank".into());
        }
        if self.username.len() > MAX_USERNAME_LEN {
            return Err(format!(
                "username length must be 1-{MAX_USERNAME_LEN}, got {}",
                self.username.len()
            ));
        }
        if self.password.len() < MIN_PASSWORD_LEN || self.password.len() > MAX_PASSWORD_LEN {
            return Err(format!(
                "password length must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN}"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.password.len() < MIN_PASSWORD_LEN || self.password.len() > MAX_PASSWORD_LEN {
            return Err(format!(
                "password length must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN}"
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_excludes_credential() {
        let account = Account {
            id: Some("a-1".into()),
            username: "alice".into(),
            password_hash: "$argon2id$...".into(),
            roles: vec![Role::User],
            entry_ids: vec!["e-1".into()],
            created_at: 42,
        };
        let json = serde_json::to_value(account.to_dto()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["roles"][0], "USER");
    }

    #[test]
    fn blank_username_is_rejected() {
        let req = RegisterRequest {
            username: " ".into(),
            password: "long-enough".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let req = RegisterRequest {
            username: "bob".into(),
            password: "short".into(),
        };
        assert!(req.validate().is_err());
    }
}
