//! External collaborators built from CLI configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use docsearch_nats::NatsClient;
use docsearch_opendal::{FixtureStore, ObjectDocumentStore, StorageBackend};
use docsearch_rig::RigEmbedder;
use docsearch_server::service::ServiceDependencies;
use docsearch_vector::PineconeIndex;

use super::Cli;
use crate::TRACING_TARGET_SERVER_STARTUP;

/// Connects to NATS, Pinecone, OpenAI and object storage.
///
/// # Errors
///
/// Returns an error if any backend cannot be reached or configured.
pub async fn create_dependencies(cli: &Cli) -> anyhow::Result<ServiceDependencies> {
    let nats = NatsClient::connect(cli.nats.clone())
        .await
        .context("failed to connect to NATS")?;
    let cache = nats
        .search_cache(Duration::from_secs(cli.service.cache_ttl_seconds))
        .await
        .context("failed to open the search cache bucket")?;
    let accounts = nats
        .account_store()
        .await
        .context("failed to open the account bucket")?;

    let index = PineconeIndex::connect(&cli.pinecone)
        .await
        .context("failed to connect to Pinecone")?;

    let embedder = RigEmbedder::new(&cli.openai).context("failed to create the embedder")?;

    let storage =
        StorageBackend::new(cli.storage.clone()).context("failed to create storage backend")?;
    let fixtures = FixtureStore::with_prefix(storage.clone(), cli.storage.fixture_prefix.clone());
    let documents = ObjectDocumentStore::new(storage);

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        pinecone_host = index.host(),
        embedding_model = embedder.model_name(),
        dimensions = embedder.dimensions(),
        "Backends connected"
    );

    Ok(ServiceDependencies {
        cache: Arc::new(cache),
        embedder: Arc::new(embedder),
        index: Arc::new(index),
        fixtures: Arc::new(fixtures),
        accounts: Arc::new(accounts),
        documents: Arc::new(documents),
    })
}
