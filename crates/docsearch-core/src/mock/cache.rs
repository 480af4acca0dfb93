use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;

use super::{CallTracker, lock};
use crate::{Result, SearchCache};

/// In-memory search cache that remembers the TTL of every write.
#[derive(Debug, Default)]
pub struct MockSearchCache {
    entries: Mutex<HashMap<String, (Bytes, u64)>>,
    gets: CallTracker,
    sets: CallTracker,
}

impl MockSearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an entry without counting it as a `set` call.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Bytes>, ttl_seconds: u64) {
        lock(&self.entries).insert(key.into(), (value.into(), ttl_seconds));
    }

    /// Returns the stored value and TTL for `key`.
    pub fn entry(&self, key: &str) -> Option<(Bytes, u64)> {
        lock(&self.entries).get(key).cloned()
    }

    pub fn get_calls(&self) -> usize {
        self.gets.calls()
    }

    pub fn set_calls(&self) -> usize {
        self.sets.calls()
    }

    /// Makes every subsequent `get` and `set` fail.
    pub fn set_failing(&self, failing: bool) {
        self.gets.set_failing(failing);
        self.sets.set_failing(failing);
    }
}

#[async_trait::async_trait]
impl SearchCache for MockSearchCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.gets.record("cache_get")?;
        Ok(lock(&self.entries).get(key).map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: Bytes, ttl_seconds: u64) -> Result<()> {
        self.sets.record("cache_set")?;
        lock(&self.entries).insert(key.to_owned(), (value, ttl_seconds));
        Ok(())
    }
}
