//! Search result cache on top of a NATS KV bucket.

use bytes::Bytes;
use docsearch_core::{Result as CoreResult, SearchCache};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use super::{CacheKey, KvStore, SearchCacheBucket};
use crate::TRACING_TARGET_KV;

/// A cached search payload with its own expiry.
///
/// The bucket `max_age` is shared by every key, so the per-write TTL is
/// enforced on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSearch {
    pub payload: Bytes,
    pub expires_at: Timestamp,
}

impl CachedSearch {
    /// Wraps `payload` so that it expires `ttl_seconds` after `now`.
    pub fn new(payload: Bytes, ttl_seconds: u64, now: Timestamp) -> Self {
        let ttl = SignedDuration::from_secs(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));
        let expires_at = now.checked_add(ttl).unwrap_or(Timestamp::MAX);
        Self {
            payload,
            expires_at,
        }
    }

    /// Whether the entry is still valid at `now`.
    #[inline]
    pub fn is_fresh(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }
}

/// [`SearchCache`] backed by the `search_cache` KV bucket.
#[derive(Clone)]
pub struct NatsSearchCache {
    store: KvStore<CacheKey, CachedSearch, SearchCacheBucket>,
}

impl NatsSearchCache {
    pub(crate) fn new(store: KvStore<CacheKey, CachedSearch, SearchCacheBucket>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for NatsSearchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsSearchCache")
            .field("bucket", &self.store.bucket_name())
            .finish()
    }
}

#[async_trait::async_trait]
impl SearchCache for NatsSearchCache {
    async fn get(&self, key: &str) -> CoreResult<Option<Bytes>> {
        let cache_key = CacheKey::new(key);
        let Some(cached) = self.store.get(&cache_key).await? else {
            return Ok(None);
        };

        if cached.is_fresh(Timestamp::now()) {
            return Ok(Some(cached.payload));
        }

        tracing::debug!(
            target: TRACING_TARGET_KV,
            key = %cache_key,
            expired_at = %cached.expires_at,
            "Evicting expired search cache entry"
        );
        if let Err(error) = self.store.delete(&cache_key).await {
            tracing::warn!(
                target: TRACING_TARGET_KV,
                key = %cache_key,
                error = %error,
                "Failed to evict expired search cache entry"
            );
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl_seconds: u64) -> CoreResult<()> {
        let cache_key = CacheKey::new(key);
        let cached = CachedSearch::new(value, ttl_seconds, Timestamp::now());
        self.store.put(&cache_key, &cached).await?;
        Ok(())
    }
}
