use tracing::trace;

use crate::accounts::repo_types::Account;

/// Fields dropped from every `find*` read unless the caller asks otherwise.
///
/// `verify` and `verifi` do not name any account field (the verified flag is
/// `verifu`). They are kept verbatim and have no effect when applied.
pub const DEFAULT_EXCLUDED: &[&str] = &["password", "verify", "verifi"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    excluded: Vec<String>,
}

impl Default for Projection {
    fn default() -> Self {
        Self::excluding(DEFAULT_EXCLUDED.iter().copied())
    }
}

impl Projection {
    pub fn excluding<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Default read projection with the password hash selected back in.
    pub fn including_password() -> Self {
        Self::default().include("password")
    }

    /// Returns every field.
    pub fn full() -> Self {
        Self { excluded: Vec::new() }
    }

    pub fn include(mut self, field: &str) -> Self {
        self.excluded.retain(|f| f != field);
        self
    }

    pub fn excludes(&self, field: &str) -> bool {
        self.excluded.iter().any(|f| f == field)
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    pub fn apply(&self, mut account: Account) -> Account {
        for field in &self.excluded {
            match field.as_str() {
                "password" => account.password = None,
                "name" => account.name = None,
                "verificationToken" | "verification_token" => account.verification_token = None,
                other => trace!(field = other, "projection names no optional account field; ignored"),
            }
        }
        account
    }

    pub fn apply_all(&self, accounts: Vec<Account>) -> Vec<Account> {
        accounts.into_iter().map(|a| self.apply(a)).collect()
    }
}
