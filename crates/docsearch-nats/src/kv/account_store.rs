//! Account persistence on top of a NATS KV bucket.

use docsearch_core::types::Account;
use docsearch_core::{AccountStore, Result as CoreResult};

use super::{AccountsBucket, KvStore, UsernameKey};
use crate::TRACING_TARGET_KV;

/// [`AccountStore`] backed by the `accounts` KV bucket.
#[derive(Clone)]
pub struct NatsAccountStore {
    store: KvStore<UsernameKey, Account, AccountsBucket>,
}

impl NatsAccountStore {
    pub(crate) fn new(store: KvStore<UsernameKey, Account, AccountsBucket>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for NatsAccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsAccountStore")
            .field("bucket", &self.store.bucket_name())
            .finish()
    }
}

#[async_trait::async_trait]
impl AccountStore for NatsAccountStore {
    async fn create(&self, account: Account) -> CoreResult<Account> {
        let key = UsernameKey::from(account.username.as_str());
        let revision = self.store.create(&key, &account).await?;
        tracing::info!(
            target: TRACING_TARGET_KV,
            account_id = %account.id,
            revision,
            "Account stored"
        );
        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> CoreResult<Option<Account>> {
        let key = UsernameKey::from(username);
        Ok(self.store.get(&key).await?)
    }
}
