use std::sync::Arc;

use rand::{distributions::Alphanumeric, Rng};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::accounts::error::{AccountError, AccountResult};
use crate::accounts::password;
use crate::accounts::projection::Projection;
use crate::accounts::repo_types::{Account, AccountChanges, AccountFilter, NewAccount, Role};
use crate::accounts::store::AccountStore;

const VERIFICATION_TOKEN_LEN: usize = 32;

/// Account persistence with hashing on write and password exclusion on read.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn AccountStore>,
    bcrypt_cost: u32,
}

impl AccountRepository {
    pub fn new(store: Arc<dyn AccountStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    /// Register a new account. The plaintext password is consumed and only
    /// its hash is stored.
    pub async fn create(&self, new: NewAccount) -> AccountResult<Account> {
        let email = new.email;
        if email.is_empty() {
            return Err(AccountError::required("email", "Email"));
        }
        let name = new
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AccountError::required("name", "Name"))?;
        let role = match new.role.as_deref() {
            Some(r) => r.parse::<Role>()?,
            None => Role::default(),
        };

        let hash = self.hash_for_persist(new.password).await?;

        let account = Account {
            id: Uuid::new_v4(),
            email,
            password: Some(hash),
            name: Some(name),
            role,
            verifu: false,
            verification_token: new.verification_token,
            created_at: OffsetDateTime::now_utc(),
        };

        let stored = self.store.insert(account).await?;
        info!(account_id = %stored.id, role = %stored.role, "account created");
        Ok(Projection::default().apply(stored))
    }

    /// Apply `changes` to the account with `id`. Only the fields in the
    /// change set are written; the stored hash is rewritten only when the
    /// change set carries a password.
    pub async fn update(&self, id: Uuid, mut changes: AccountChanges) -> AccountResult<Account> {
        let password_modified = changes.is_password_modified();
        if let Some(plain) = changes.password.take() {
            changes.password = Some(self.hash_for_persist(plain).await?);
        }

        let stored = self.store.update(id, &changes).await?;
        debug!(account_id = %stored.id, password_modified, "account updated");
        Ok(Projection::default().apply(stored))
    }

    /// Pre-persist step: trims the plaintext and returns its hash.
    async fn hash_for_persist(&self, plain: String) -> AccountResult<String> {
        let plain = plain.trim().to_string();
        if plain.is_empty() {
            return Err(AccountError::required("password", "Password"));
        }
        let cost = self.bcrypt_cost;
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain, cost)).await??;
        Ok(hash)
    }

    pub async fn find(&self, filter: &AccountFilter, projection: &Projection) -> AccountResult<Vec<Account>> {
        let accounts = self.store.query(filter).await?;
        Ok(projection.apply_all(accounts))
    }

    async fn find_one(&self, filter: AccountFilter, projection: &Projection) -> AccountResult<Option<Account>> {
        Ok(self.find(&filter, projection).await?.into_iter().next())
    }

    pub async fn find_all(&self) -> AccountResult<Vec<Account>> {
        self.find(&AccountFilter::All, &Projection::default()).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> AccountResult<Option<Account>> {
        self.find_one(AccountFilter::Id(id), &Projection::default())
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> AccountResult<Option<Account>> {
        self.find_one(AccountFilter::Email(email.to_string()), &Projection::default())
            .await
    }

    pub async fn find_by_verification_token(&self, token: &str) -> AccountResult<Option<Account>> {
        self.find_one(
            AccountFilter::VerificationToken(token.to_string()),
            &Projection::default(),
        )
        .await
    }

    /// Read for login flows: the password hash is selected back in.
    pub async fn find_by_email_with_password(&self, email: &str) -> AccountResult<Option<Account>> {
        self.find_one(
            AccountFilter::Email(email.to_string()),
            &Projection::including_password(),
        )
        .await
    }

    pub async fn find_by_id_with_password(&self, id: Uuid) -> AccountResult<Option<Account>> {
        self.find_one(AccountFilter::Id(id), &Projection::including_password())
            .await
    }

    /// Compare a candidate against a stored hash. No side effects.
    pub async fn verify_password(&self, candidate: &str, stored_hash: &str) -> AccountResult<bool> {
        let candidate = candidate.to_string();
        let stored_hash = stored_hash.to_string();
        let matches =
            tokio::task::spawn_blocking(move || password::verify_password(&candidate, &stored_hash))
                .await??;
        Ok(matches)
    }

    /// Returns the account (password projected out) when `candidate`
    /// matches, `None` for an unknown email or a wrong password.
    pub async fn authenticate(&self, email: &str, candidate: &str) -> AccountResult<Option<Account>> {
        let Some(account) = self.find_by_email_with_password(email).await? else {
            debug!("authenticate: unknown email");
            return Ok(None);
        };
        let Some(hash) = account.password.as_deref() else {
            return Ok(None);
        };
        if !self.verify_password(candidate, hash).await? {
            warn!(account_id = %account.id, "authenticate: password mismatch");
            return Ok(None);
        }
        Ok(Some(Projection::default().apply(account)))
    }

    /// Generate a fresh token and move the account back to pending.
    pub async fn issue_verification_token(&self, id: Uuid) -> AccountResult<String> {
        let token = generate_token();
        self.update(
            id,
            AccountChanges {
                verifu: Some(false),
                verification_token: Some(Some(token.clone())),
                ..Default::default()
            },
        )
        .await?;
        Ok(token)
    }

    /// Pending to verified: sets the flag and clears the token.
    pub async fn mark_verified(&self, token: &str) -> AccountResult<Account> {
        let account = self
            .find_by_verification_token(token)
            .await?
            .ok_or(AccountError::NotFound)?;
        let verified = self
            .update(
                account.id,
                AccountChanges {
                    verifu: Some(true),
                    verification_token: Some(None),
                    ..Default::default()
                },
            )
            .await?;
        info!(account_id = %verified.id, "account verified");
        Ok(verified)
    }

    pub async fn set_role(&self, id: Uuid, role: Role) -> AccountResult<Account> {
        let account = self
            .update(
                id,
                AccountChanges {
                    role: Some(role),
                    ..Default::default()
                },
            )
            .await?;
        info!(account_id = %id, %role, "account role changed");
        Ok(account)
    }

    pub async fn delete(&self, id: Uuid) -> AccountResult<()> {
        if !self.store.delete(id).await? {
            return Err(AccountError::NotFound);
        }
        info!(account_id = %id, "account deleted");
        Ok(())
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}
