use bytes::Bytes;

use crate::Result;

/// Key/value store with expiring entries used to memoize search results.
#[async_trait::async_trait]
pub trait SearchCache: Send + Sync {
    /// Returns the cached bytes for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Stores `value` under `key` for `ttl_seconds`.
    async fn set(&self, key: &str, value: Bytes, ttl_seconds: u64) -> Result<()>;
}
