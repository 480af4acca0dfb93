use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;
use crate::types::Account;
use crate::{AccountStore, Error, Result};

/// In-memory account store keyed by username.
#[derive(Debug, Default)]
pub struct MockAccountStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MockAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored accounts.
    pub fn len(&self) -> usize {
        lock(&self.accounts).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl AccountStore for MockAccountStore {
    async fn create(&self, account: Account) -> Result<Account> {
        let mut accounts = lock(&self.accounts);
        if accounts.contains_key(&account.username) {
            return Err(Error::conflict()
                .with_message(format!("account {} already exists", account.username)));
        }
        accounts.insert(account.username.clone(), account.clone());
        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(lock(&self.accounts).get(username).cloned())
    }
}
