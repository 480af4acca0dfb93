//! Shared NATS connection and the KV stores opened on it.

use std::sync::Arc;
use std::time::Duration;

use async_nats::{ConnectOptions, jetstream};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::nats_config::NatsConfig;
use crate::kv::{
    AccountsBucket, KvBucket, KvKey, KvStore, NatsAccountStore, NatsSearchCache, SearchCacheBucket,
};
use crate::{Error, Result, TRACING_TARGET_CLIENT, TRACING_TARGET_CONNECTION};

/// Handle to one JetStream enabled connection.
///
/// `async-nats` multiplexes and reconnects internally, so one client is
/// created at startup and every store shares it.
#[derive(Debug, Clone)]
pub struct NatsClient {
    jetstream: Arc<jetstream::Context>,
}

impl NatsClient {
    #[tracing::instrument(skip(config), target = TRACING_TARGET_CONNECTION)]
    pub async fn connect(config: NatsConfig) -> Result<Self> {
        config.validate()?;

        let mut options = ConnectOptions::new()
            .name(&config.nats_client_name)
            .connection_timeout(config.connect_timeout())
            .ping_interval(Duration::from_secs(30))
            .reconnect_delay_callback(NatsConfig::reconnect_delay);
        if let Some(token) = &config.nats_token {
            options = options.token(token.clone());
        }
        if let Some(max) = config.max_reconnects() {
            options = options.max_reconnects(max);
        }

        let servers = config.servers().collect::<Vec<_>>().join(",");
        let limit = config.connect_timeout();
        let connecting = async_nats::connect_with_options(servers.as_str(), options);
        let client = tokio::time::timeout(limit, connecting)
            .await
            .map_err(|_| Error::timeout(limit))?
            .map_err(|e| Error::Connection(Box::new(e)))?;

        let info = client.server_info();
        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            server = %info.host,
            version = %info.version,
            "Connected to NATS"
        );

        Ok(Self {
            jetstream: Arc::new(jetstream::new(client)),
        })
    }

    /// Opens bucket `B` using its declared TTL.
    pub async fn kv_store<K, V, B>(&self) -> Result<KvStore<K, V, B>>
    where
        K: KvKey,
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
        B: KvBucket,
    {
        KvStore::new(&self.jetstream).await
    }

    /// Opens bucket `B` with `max_age` overriding its declared TTL.
    pub async fn kv_store_with_ttl<K, V, B>(&self, max_age: Duration) -> Result<KvStore<K, V, B>>
    where
        K: KvKey,
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
        B: KvBucket,
    {
        KvStore::with_ttl(&self.jetstream, max_age).await
    }

    /// Opens the search cache.
    ///
    /// `max_ttl` caps how long the bucket keeps any entry. Entries carry
    /// their own expiry and may go stale sooner.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn search_cache(&self, max_ttl: Duration) -> Result<NatsSearchCache> {
        self.kv_store_with_ttl::<_, _, SearchCacheBucket>(max_ttl)
            .await
            .map(NatsSearchCache::new)
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_CLIENT)]
    pub async fn account_store(&self) -> Result<NatsAccountStore> {
        self.kv_store::<_, _, AccountsBucket>()
            .await
            .map(NatsAccountStore::new)
    }
}
