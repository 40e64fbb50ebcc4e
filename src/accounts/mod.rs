mod error;
pub mod password;
pub mod pg;
pub mod projection;
pub mod repo;
pub mod repo_types;
pub mod store;

pub use error::{AccountError, AccountResult};
pub use pg::PgAccountStore;
pub use projection::Projection;
pub use repo::AccountRepository;
pub use repo_types::{Account, AccountChanges, AccountFilter, NewAccount, Role};
pub use store::{AccountStore, MemoryAccountStore};
