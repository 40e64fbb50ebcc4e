use thiserror::Error;

pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("account not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AccountError {
    /// Validation failure for a required field left empty.
    pub fn required(field: &'static str, label: &str) -> Self {
        AccountError::Validation {
            field,
            message: format!("{label} is required"),
        }
    }

    pub fn invalid_role() -> Self {
        AccountError::Validation {
            field: "role",
            message: "The role must be either user or admin".into(),
        }
    }

    /// Field a validation error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AccountError::Validation { field, .. } => Some(*field),
            AccountError::DuplicateEmail(_) => Some("email"),
            _ => None,
        }
    }
}
