//! Cache-fronted semantic search.

use std::sync::Arc;

use bytes::Bytes;
use docsearch_core::types::MetadataFilter;
use docsearch_core::{EmbeddingProvider, SearchCache, VectorIndex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_SEARCH;
use crate::service::ServiceConfig;

/// A ranked paragraph returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MatchResult {
    /// Similarity score reported by the index.
    pub score: f32,
    /// Paragraph text.
    pub text: String,
}

/// Search failures. Both variants are upstream errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("embedding provider unavailable")]
    EmbeddingUnavailable(#[source] docsearch_core::Error),

    #[error("vector index unavailable")]
    IndexUnavailable(#[source] docsearch_core::Error),
}

impl SearchError {
    /// Returns the failing stage.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::EmbeddingUnavailable(_) => "embedding",
            Self::IndexUnavailable(_) => "vector_index",
        }
    }
}

/// Builds the cache key of a query against one document.
#[inline]
pub fn cache_key(query_text: &str, file_id: &str) -> String {
    format!("{query_text}_{file_id}")
}

/// Search pipeline over injected collaborators.
#[derive(Clone)]
pub struct SearchService {
    cache: Arc<dyn SearchCache>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    namespace: String,
    top_k: u32,
    ttl_seconds: u64,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("namespace", &self.namespace)
            .field("top_k", &self.top_k)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl SearchService {
    pub fn new(
        config: &ServiceConfig,
        cache: Arc<dyn SearchCache>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            cache,
            embedder,
            index,
            namespace: config.embedding_namespace.clone(),
            top_k: config.search_top_k,
            ttl_seconds: config.cache_ttl_seconds,
        }
    }

    /// Returns the paragraphs of `file_id` closest to `query_text`, best first.
    ///
    /// Cached results are served without touching the embedder or the index.
    /// Cache failures degrade to a miss and never fail the search.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_SEARCH)]
    pub async fn search(
        &self,
        query_text: &str,
        file_id: &str,
    ) -> Result<Vec<MatchResult>, SearchError> {
        let key = cache_key(query_text, file_id);

        if let Some(cached) = self.cached(&key).await {
            tracing::debug!(target: TRACING_TARGET_SEARCH, results = cached.len(), "Cache hit");
            return Ok(cached);
        }

        let vector = self
            .embedder
            .embed_one(query_text)
            .await
            .map_err(SearchError::EmbeddingUnavailable)?;

        let matches = self
            .index
            .query(
                &self.namespace,
                MetadataFilter::file_id(file_id),
                vector,
                self.top_k,
                true,
            )
            .await
            .map_err(SearchError::IndexUnavailable)?;

        let results: Vec<MatchResult> = matches
            .into_iter()
            .map(|m| MatchResult {
                score: m.score,
                text: m.metadata.map(|meta| meta.text).unwrap_or_default(),
            })
            .collect();

        self.store(&key, &results).await;

        tracing::debug!(target: TRACING_TARGET_SEARCH, results = results.len(), "Search completed");
        Ok(results)
    }

    async fn cached(&self, key: &str) -> Option<Vec<MatchResult>> {
        let bytes = match self.cache.get(key).await {
            Ok(bytes) => bytes?,
            Err(error) => {
                tracing::warn!(target: TRACING_TARGET_SEARCH, error = %error, "Cache read failed");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(results) => Some(results),
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_SEARCH,
                    error = %error,
                    "Discarding undecodable cache entry"
                );
                None
            }
        }
    }

    async fn store(&self, key: &str, results: &[MatchResult]) {
        let bytes = match serde_json::to_vec(results) {
            Ok(bytes) => Bytes::from(bytes),
            Err(error) => {
                tracing::warn!(target: TRACING_TARGET_SEARCH, error = %error, "Cannot encode results");
                return;
            }
        };

        if let Err(error) = self.cache.set(key, bytes, self.ttl_seconds).await {
            tracing::warn!(target: TRACING_TARGET_SEARCH, error = %error, "Cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use docsearch_core::mock::{MockEmbedder, MockSearchCache, MockVectorIndex};
    use docsearch_core::types::{QueryMatch, RecordMetadata};

    use super::*;

    struct Harness {
        cache: Arc<MockSearchCache>,
        embedder: Arc<MockEmbedder>,
        index: Arc<MockVectorIndex>,
        service: SearchService,
    }

    fn harness(index: MockVectorIndex) -> anyhow::Result<Harness> {
        let config = ServiceConfig::builder()
            .with_jwt_secret_key("test-secret")
            .with_cache_ttl_seconds(600_u64)
            .build()?;

        let cache = Arc::new(MockSearchCache::new());
        let embedder = Arc::new(MockEmbedder::new(4));
        let index = Arc::new(index);
        let service = SearchService::new(&config, cache.clone(), embedder.clone(), index.clone());

        Ok(Harness {
            cache,
            embedder,
            index,
            service,
        })
    }

    fn canned() -> MockVectorIndex {
        MockVectorIndex::with_canned_matches(vec![
            QueryMatch {
                id: "1".into(),
                score: 0.91,
                metadata: Some(RecordMetadata::new("Invoice total", "doc.pdf")),
            },
            QueryMatch {
                id: "2".into(),
                score: 0.42,
                metadata: None,
            },
        ])
    }

    #[tokio::test]
    async fn cold_cache_queries_and_stores() -> anyhow::Result<()> {
        let h = harness(canned())?;

        let results = h.service.search("total", "doc.pdf").await?;
        assert_eq!(
            results,
            vec![
                MatchResult {
                    score: 0.91,
                    text: "Invoice total".into()
                },
                MatchResult {
                    score: 0.42,
                    text: String::new()
                },
            ]
        );

        assert_eq!(h.embedder.embed_one_calls(), 1);
        assert_eq!(h.index.query_calls(), 1);

        let query = &h.index.queries()[0];
        assert_eq!(query.namespace, "paragraphs");
        assert_eq!(query.filter, MetadataFilter::file_id("doc.pdf"));
        assert_eq!(query.top_k, 5);
        assert!(query.include_metadata);

        let (bytes, ttl) = h
            .cache
            .entry("total_doc.pdf")
            .ok_or_else(|| anyhow::anyhow!("results were not cached"))?;
        assert_eq!(ttl, 600);
        let stored: Vec<MatchResult> = serde_json::from_slice(&bytes)?;
        assert_eq!(stored, results);
        Ok(())
    }

    #[tokio::test]
    async fn warm_cache_skips_collaborators() -> anyhow::Result<()> {
        let h = harness(canned())?;
        let cached = vec![MatchResult {
            score: 0.5,
            text: "from cache".into(),
        }];
        h.cache
            .insert("total_doc.pdf", serde_json::to_vec(&cached)?, 600);

        let results = h.service.search("total", "doc.pdf").await?;
        assert_eq!(results, cached);
        assert_eq!(h.embedder.embed_one_calls(), 0);
        assert_eq!(h.index.query_calls(), 0);
        assert_eq!(h.cache.set_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn repeated_search_is_idempotent() -> anyhow::Result<()> {
        let h = harness(canned())?;

        let first = h.service.search("total", "doc.pdf").await?;
        let second = h.service.search("total", "doc.pdf").await?;

        assert_eq!(first, second);
        assert_eq!(h.embedder.embed_one_calls(), 1);
        assert_eq!(h.index.query_calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss() -> anyhow::Result<()> {
        let h = harness(canned())?;
        h.cache.insert("total_doc.pdf", &b"not json"[..], 600);

        let results = h.service.search("total", "doc.pdf").await?;
        assert_eq!(results.len(), 2);
        assert_eq!(h.index.query_calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn cache_outage_does_not_fail_search() -> anyhow::Result<()> {
        let h = harness(canned())?;
        h.cache.set_failing(true);

        let results = h.service.search("total", "doc.pdf").await?;
        assert_eq!(results.len(), 2);
        assert_eq!(h.cache.set_calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn embedding_outage_is_reported() -> anyhow::Result<()> {
        let h = harness(canned())?;
        h.embedder.set_failing(true);

        let err = h.service.search("total", "doc.pdf").await.unwrap_err();
        assert_eq!(err.stage(), "embedding");
        assert_eq!(h.index.query_calls(), 0);
        assert!(h.cache.entry("total_doc.pdf").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn index_outage_is_reported() -> anyhow::Result<()> {
        let h = harness(canned())?;
        h.index.set_query_failing(true);

        let err = h.service.search("total", "doc.pdf").await.unwrap_err();
        assert!(matches!(err, SearchError::IndexUnavailable(_)));
        assert_eq!(h.cache.set_calls(), 0);
        Ok(())
    }

    #[test]
    fn cache_key_joins_query_and_file() {
        assert_eq!(cache_key("net total", "a.pdf"), "net total_a.pdf");
    }
}
