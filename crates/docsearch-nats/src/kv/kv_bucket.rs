//! Key-value bucket configuration traits.

use std::time::Duration;

/// Marker trait for KV bucket configuration.
pub trait KvBucket: Clone + Send + Sync + 'static {
    /// Bucket name used in NATS KV.
    const NAME: &'static str;

    /// Human-readable description for the bucket.
    const DESCRIPTION: &'static str;

    /// Default TTL for entries in this bucket.
    /// `None` for buckets where entries should not expire.
    const TTL: Option<Duration>;
}

/// Bucket memoizing semantic search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SearchCacheBucket;

impl KvBucket for SearchCacheBucket {
    const NAME: &'static str = "search_cache";
    const DESCRIPTION: &'static str = "Memoized semantic search results";
    const TTL: Option<Duration> = Some(Duration::from_secs(24 * 60 * 60)); // 24 hours
}

/// Bucket holding registered accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccountsBucket;

impl KvBucket for AccountsBucket {
    const NAME: &'static str = "accounts";
    const DESCRIPTION: &'static str = "Registered user accounts";
    const TTL: Option<Duration> = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_cache_bucket() {
        assert_eq!(SearchCacheBucket::NAME, "search_cache");
        assert_eq!(
            SearchCacheBucket::TTL,
            Some(Duration::from_secs(24 * 60 * 60))
        );
    }

    #[test]
    fn test_accounts_bucket_never_expires() {
        assert_eq!(AccountsBucket::NAME, "accounts");
        assert_eq!(AccountsBucket::TTL, None);
    }
}
