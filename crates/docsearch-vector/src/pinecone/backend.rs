//! Pinecone index client implementing [`VectorIndex`].

use docsearch_core::types::{MetadataFilter, QueryMatch, VectorRecord};
use docsearch_core::{Result as CoreResult, VectorIndex};
use pinecone_sdk::models::{Namespace, Vector};
use pinecone_sdk::pinecone::PineconeClientConfig;
use pinecone_sdk::pinecone::data::Index;
use tokio::sync::Mutex;

use super::PineconeConfig;
use super::convert::{filter_metadata, metadata_to_record, record_metadata};
use crate::{TRACING_TARGET, VectorError, VectorResult};

/// Handle to a single Pinecone index.
///
/// The data-plane client needs `&mut` access, so calls are serialized
/// through a mutex.
pub struct PineconeIndex {
    index: Mutex<Index>,
    host: String,
}

impl PineconeIndex {
    /// Connects to the index described by `config`.
    pub async fn connect(config: &PineconeConfig) -> VectorResult<Self> {
        config.validate()?;

        let client_config = PineconeClientConfig {
            api_key: Some(config.api_key.clone()),
            ..Default::default()
        };
        let client = client_config
            .client()
            .map_err(|e| VectorError::connection(e.to_string()))?;

        let host = match (&config.host, &config.index) {
            (Some(host), _) if !host.trim().is_empty() => host.clone(),
            (_, Some(name)) => {
                let description = client.describe_index(name).await.map_err(|e| {
                    VectorError::connection(format!("Failed to describe index {name}: {e}"))
                })?;
                description.host
            }
            _ => {
                return Err(VectorError::invalid_config(
                    "Either a Pinecone index host or an index name is required",
                ));
            }
        };

        let index = client
            .index(&host)
            .await
            .map_err(|e| VectorError::connection(format!("Failed to connect to index: {e}")))?;

        tracing::info!(
            target: TRACING_TARGET,
            host = %host,
            "Pinecone index connected"
        );

        Ok(Self {
            index: Mutex::new(index),
            host,
        })
    }

    /// Returns the data-plane host of the index.
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl std::fmt::Debug for PineconeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeIndex")
            .field("host", &self.host)
            .finish()
    }
}

#[async_trait::async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> CoreResult<()> {
        let count = records.len();
        let vectors: Vec<Vector> = records
            .into_iter()
            .map(|record| Vector {
                id: record.id.to_string(),
                metadata: Some(record_metadata(&record.metadata)),
                values: record.values,
                sparse_values: None,
            })
            .collect();

        let mut index = self.index.lock().await;
        index
            .upsert(&vectors, &Namespace::from(namespace))
            .await
            .map_err(|e| VectorError::backend(e.to_string()))?;

        tracing::debug!(
            target: TRACING_TARGET,
            namespace,
            count,
            "Upserted vectors"
        );
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        filter: MetadataFilter,
        vector: Vec<f32>,
        top_k: u32,
        include_metadata: bool,
    ) -> CoreResult<Vec<QueryMatch>> {
        let mut index = self.index.lock().await;
        let response = index
            .query_by_value(
                vector,
                None, // sparse values
                top_k,
                &Namespace::from(namespace),
                filter_metadata(&filter),
                Some(false),
                Some(include_metadata),
            )
            .await
            .map_err(|e| VectorError::backend(e.to_string()))?;

        let matches: Vec<QueryMatch> = response
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.and_then(metadata_to_record),
            })
            .collect();

        tracing::debug!(
            target: TRACING_TARGET,
            namespace,
            top_k,
            returned = matches.len(),
            "Queried vectors"
        );
        Ok(matches)
    }
}
