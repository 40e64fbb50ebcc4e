use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::accounts::error::AccountError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(AccountError::invalid_role()),
        }
    }
}

/// Account record as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    /// bcrypt hash; `None` once projected out of a read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub verifu: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Account {
    pub fn is_verified(&self) -> bool {
        self.verifu && self.verification_token.is_none()
    }
}

/// Candidate record submitted at registration. Absent fields fall back to
/// empty values so the repository reports them as required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub verification_token: Option<String>,
}

impl NewAccount {
    pub fn new(email: impl Into<String>, password: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Field changes for an update. `None` leaves the field as stored.
///
/// The repository swaps a plaintext `password` for its hash before the
/// change set reaches a store, so stores only ever write hashes.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub password: Option<String>,
    /// `Some(None)` clears the name.
    pub name: Option<Option<String>>,
    pub role: Option<Role>,
    pub verifu: Option<bool>,
    /// `Some(None)` clears the token.
    pub verification_token: Option<Option<String>>,
}

impl AccountChanges {
    pub fn password(plain: impl Into<String>) -> Self {
        Self {
            password: Some(plain.into()),
            ..Default::default()
        }
    }

    pub fn is_password_modified(&self) -> bool {
        self.password.is_some()
    }

    /// Writes only the fields present in the change set.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(password) = &self.password {
            account.password = Some(password.clone());
        }
        if let Some(name) = &self.name {
            account.name = name.clone();
        }
        if let Some(role) = self.role {
            account.role = role;
        }
        if let Some(verifu) = self.verifu {
            account.verifu = verifu;
        }
        if let Some(token) = &self.verification_token {
            account.verification_token = token.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    All,
    Id(Uuid),
    Email(String),
    VerificationToken(String),
}

impl AccountFilter {
    pub fn matches(&self, account: &Account) -> bool {
        match self {
            AccountFilter::All => true,
            AccountFilter::Id(id) => account.id == *id,
            AccountFilter::Email(email) => account.email == *email,
            AccountFilter::VerificationToken(token) => {
                account.verification_token.as_deref() == Some(token.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_values_only() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        let err = "root".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "The role must be either user or admin");
        assert_eq!(err.field(), Some("role"));
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn missing_password_is_not_serialized() {
        let account = Account {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password: None,
            name: Some("Ann".into()),
            role: Role::Admin,
            verifu: false,
            verification_token: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "admin");
        assert_eq!(json["verifu"], false);
    }

    #[test]
    fn changes_touch_only_listed_fields() {
        let mut account = Account {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            password: Some("$2b$04$old".into()),
            name: Some("Ann".into()),
            role: Role::User,
            verifu: false,
            verification_token: Some("tok".into()),
            created_at: OffsetDateTime::now_utc(),
        };
        AccountChanges {
            name: Some(None),
            verifu: Some(true),
            ..Default::default()
        }
        .apply_to(&mut account);
        assert!(account.name.is_none());
        assert!(account.verifu);
        assert_eq!(account.password.as_deref(), Some("$2b$04$old"));
        assert_eq!(account.verification_token.as_deref(), Some("tok"));
    }

    #[test]
    fn new_account_tolerates_missing_fields() {
        let new: NewAccount = serde_json::from_str(r#"{"email":"a@x.com","name":"Ann"}"#).unwrap();
        assert!(new.password.is_empty());
        assert_eq!(new.name.as_deref(), Some("Ann"));
        assert!(new.role.is_none());
    }
}
