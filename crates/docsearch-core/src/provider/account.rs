use crate::Result;
use crate::types::Account;

/// Persistent account storage keyed by username.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Stores a new account.
    ///
    /// Fails with [`ErrorKind::Conflict`](crate::ErrorKind::Conflict) when the
    /// username is already taken.
    async fn create(&self, account: Account) -> Result<Account>;

    /// Looks up an account by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;
}
