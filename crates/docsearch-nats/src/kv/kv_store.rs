//! Typed JSON values over a JetStream KV bucket.

use std::marker::PhantomData;
use std::time::Duration;

use async_nats::jetstream::{self, kv};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{KvBucket, KvKey};
use crate::{Error, Result, TRACING_TARGET_KV};

/// A KV bucket `B` mapping keys `K` to JSON encoded values `V`.
pub struct KvStore<K, V, B> {
    store: kv::Store,
    _marker: PhantomData<fn() -> (K, V, B)>,
}

impl<K, V, B> Clone for KvStore<K, V, B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

/// How a write treats an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Overwrite,
    CreateOnly,
}

impl<K, V, B> KvStore<K, V, B>
where
    K: KvKey,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
    B: KvBucket,
{
    /// Opens the bucket, creating it with the bucket's own TTL when missing.
    pub(crate) async fn new(jetstream: &jetstream::Context) -> Result<Self> {
        Self::with_ttl(jetstream, B::TTL.unwrap_or_default()).await
    }

    /// Opens the bucket, creating it with `max_age` when missing.
    ///
    /// A zero `max_age` keeps entries until they are deleted.
    #[tracing::instrument(skip(jetstream), target = TRACING_TARGET_KV, fields(bucket = B::NAME))]
    pub(crate) async fn with_ttl(
        jetstream: &jetstream::Context,
        max_age: Duration,
    ) -> Result<Self> {
        if let Ok(store) = jetstream.get_key_value(B::NAME).await {
            return Ok(Self::from_store(store));
        }

        tracing::info!(
            target: TRACING_TARGET_KV,
            bucket = B::NAME,
            max_age_secs = max_age.as_secs(),
            "Creating KV bucket"
        );

        let store = jetstream
            .create_key_value(kv::Config {
                bucket: B::NAME.to_owned(),
                description: B::DESCRIPTION.to_owned(),
                max_age,
                ..Default::default()
            })
            .await
            .map_err(|e| Error::operation("kv_create_bucket", e.to_string()))?;

        Ok(Self::from_store(store))
    }

    fn from_store(store: kv::Store) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn bucket_name(&self) -> &'static str {
        B::NAME
    }

    /// Stores `value` under `key`, replacing the current revision.
    ///
    /// Returns the new revision.
    pub async fn put(&self, key: &K, value: &V) -> Result<u64> {
        self.write(key, value, WriteMode::Overwrite).await
    }

    /// Stores `value` under `key` unless the key already holds a value.
    ///
    /// An occupied key fails with [`Error::KvKeyExists`].
    pub async fn create(&self, key: &K, value: &V) -> Result<u64> {
        self.write(key, value, WriteMode::CreateOnly).await
    }

    #[tracing::instrument(skip(self, value), target = TRACING_TARGET_KV, fields(bucket = B::NAME))]
    async fn write(&self, key: &K, value: &V, mode: WriteMode) -> Result<u64> {
        let key = key.to_string();
        let payload = Bytes::from(serde_json::to_vec(value)?);
        let size_bytes = payload.len();

        let revision = match mode {
            WriteMode::Overwrite => self
                .store
                .put(&key, payload)
                .await
                .map_err(|e| Error::operation("kv_put", e.to_string()))?,
            WriteMode::CreateOnly => {
                self.store
                    .create(&key, payload)
                    .await
                    .map_err(|e| match e.kind() {
                        kv::CreateErrorKind::AlreadyExists => {
                            Error::kv_key_exists(B::NAME, &key)
                        }
                        _ => Error::operation("kv_create", e.to_string()),
                    })?
            }
        };

        tracing::debug!(target: TRACING_TARGET_KV, revision, size_bytes, "KV write");
        Ok(revision)
    }

    /// Reads the value under `key`.
    ///
    /// Deleted keys leave tombstones behind; those read as missing.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_KV, fields(bucket = B::NAME))]
    pub async fn get(&self, key: &K) -> Result<Option<V>> {
        let entry = self
            .store
            .entry(key.to_string())
            .await
            .map_err(|e| Error::operation("kv_get", e.to_string()))?;

        match entry {
            Some(entry) if matches!(entry.operation, kv::Operation::Put) => {
                Ok(Some(serde_json::from_slice(&entry.value)?))
            }
            _ => Ok(None),
        }
    }

    /// Removes `key` together with its history.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_KV, fields(bucket = B::NAME))]
    pub async fn delete(&self, key: &K) -> Result<()> {
        self.store
            .purge(key.to_string())
            .await
            .map_err(|e| Error::operation("kv_delete", e.to_string()))
    }
}
