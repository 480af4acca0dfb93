//! NATS Key-Value store operations.
//!
//! This module provides type-safe abstractions over NATS KV:
//! - `KvStore<K, V, B>`: generic typed key-value operations
//! - `KvKey`: trait for key types
//! - `KvBucket`: trait for bucket configuration
//!
//! and the two docsearch stores built on them, [`NatsSearchCache`] and
//! [`NatsAccountStore`].

mod account_store;
mod kv_bucket;
mod kv_key;
mod kv_store;
mod search_cache;

pub use account_store::NatsAccountStore;
pub use kv_bucket::{AccountsBucket, KvBucket, SearchCacheBucket};
pub use kv_key::{CacheKey, KvKey, UsernameKey};
pub use kv_store::KvStore;
pub use search_cache::{CachedSearch, NatsSearchCache};
