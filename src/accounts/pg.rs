use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use crate::accounts::error::{AccountError, AccountResult};
use crate::accounts::repo_types::{Account, AccountChanges, AccountFilter};
use crate::accounts::store::AccountStore;

const COLUMNS: &str = "id, email, password, name, role, verifu, verification_token, created_at";

/// Row in the `users` table.
#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password: String,
    name: Option<String>,
    role: String,
    verifu: bool,
    verification_token: Option<String>,
    created_at: OffsetDateTime,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id,
            email: row.email,
            password: Some(row.password),
            name: row.name,
            role: row.role.parse()?,
            verifu: row.verifu,
            verification_token: row.verification_token,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_write_error(e: sqlx::Error, email: &str) -> AccountError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AccountError::DuplicateEmail(email.to_string());
        }
    }
    error!(error = %e, "users write failed");
    AccountError::Store(e)
}

fn stored_password(account: &Account) -> AccountResult<&str> {
    account
        .password
        .as_deref()
        .ok_or_else(|| AccountError::required("password", "Password"))
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: Account) -> AccountResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            INSERT INTO users (id, email, password, name, role, verifu, verification_token, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(account.id)
        .bind(&account.email)
        .bind(stored_password(&account)?)
        .bind(&account.name)
        .bind(account.role.as_str())
        .bind(account.verifu)
        .bind(&account.verification_token)
        .bind(account.created_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, &account.email))?;
        row.try_into()
    }

    async fn update(&self, id: Uuid, changes: &AccountChanges) -> AccountResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE users
            SET password = COALESCE($2, password),
                name = CASE WHEN $3 THEN $4 ELSE name END,
                role = COALESCE($5, role),
                verifu = COALESCE($6, verifu),
                verification_token = CASE WHEN $7 THEN $8 ELSE verification_token END
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.password.as_deref())
        .bind(changes.name.is_some())
        .bind(changes.name.clone().flatten())
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.verifu)
        .bind(changes.verification_token.is_some())
        .bind(changes.verification_token.clone().flatten())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "users update failed");
            e
        })?
        .ok_or(AccountError::NotFound)?;
        row.try_into()
    }

    async fn query(&self, filter: &AccountFilter) -> AccountResult<Vec<Account>> {
        let rows = match filter {
            AccountFilter::All => {
                sqlx::query_as::<_, AccountRow>(&format!(
                    "SELECT {COLUMNS} FROM users ORDER BY created_at"
                ))
                .fetch_all(&self.db)
                .await?
            }
            AccountFilter::Id(id) => {
                sqlx::query_as::<_, AccountRow>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
                    .bind(id)
                    .fetch_all(&self.db)
                    .await?
            }
            AccountFilter::Email(email) => {
                sqlx::query_as::<_, AccountRow>(&format!(
                    "SELECT {COLUMNS} FROM users WHERE email = $1"
                ))
                .bind(email)
                .fetch_all(&self.db)
                .await?
            }
            AccountFilter::VerificationToken(token) => {
                sqlx::query_as::<_, AccountRow>(&format!(
                    "SELECT {COLUMNS} FROM users WHERE verification_token = $1"
                ))
                .bind(token)
                .fetch_all(&self.db)
                .await?
            }
        };
        rows.into_iter().map(Account::try_from).collect()
    }

    async fn delete(&self, id: Uuid) -> AccountResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
