use crate::Result;
use crate::types::{MetadataFilter, QueryMatch, VectorRecord};

/// Namespaced vector store supporting batched upsert and filtered similarity queries.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces `records` under `namespace`.
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<()>;

    /// Returns the `top_k` nearest neighbours of `vector` matching `filter`.
    ///
    /// Matches are ranked by descending similarity score. Raw vector values
    /// are never requested.
    async fn query(
        &self,
        namespace: &str,
        filter: MetadataFilter,
        vector: Vec<f32>,
        top_k: u32,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>>;
}
