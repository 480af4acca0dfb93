use std::sync::Mutex;

use super::{CallTracker, lock};
use crate::types::{MetadataFilter, QueryMatch, VectorRecord};
use crate::{Result, VectorIndex};

/// A recorded `query` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub namespace: String,
    pub filter: MetadataFilter,
    pub top_k: u32,
    pub include_metadata: bool,
}

/// In-memory vector index ranking by cosine similarity.
///
/// Every upsert call is kept as a separate chunk so tests can inspect
/// batching. Canned matches, when set, are returned verbatim from `query`.
#[derive(Debug, Default)]
pub struct MockVectorIndex {
    chunks: Mutex<Vec<(String, Vec<VectorRecord>)>>,
    queries: Mutex<Vec<RecordedQuery>>,
    canned: Mutex<Option<Vec<QueryMatch>>>,
    upserts: CallTracker,
    lookups: CallTracker,
}

impl MockVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `query` return exactly `matches`, in this order.
    pub fn with_canned_matches(matches: Vec<QueryMatch>) -> Self {
        let index = Self::default();
        index.set_canned_matches(matches);
        index
    }

    /// Replaces the matches returned by `query`.
    pub fn set_canned_matches(&self, matches: Vec<QueryMatch>) {
        *lock(&self.canned) = Some(matches);
    }

    /// Returns every upserted chunk with its namespace, in call order.
    pub fn chunks(&self) -> Vec<(String, Vec<VectorRecord>)> {
        lock(&self.chunks).clone()
    }

    /// Returns all upserted records flattened across chunks.
    pub fn records(&self) -> Vec<VectorRecord> {
        lock(&self.chunks)
            .iter()
            .flat_map(|(_, records)| records.iter().cloned())
            .collect()
    }

    /// Returns every recorded `query` call.
    pub fn queries(&self) -> Vec<RecordedQuery> {
        lock(&self.queries).clone()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.calls()
    }

    pub fn query_calls(&self) -> usize {
        self.lookups.calls()
    }

    /// Makes every subsequent `upsert` fail.
    pub fn set_upsert_failing(&self, failing: bool) {
        self.upserts.set_failing(failing);
    }

    /// Makes every subsequent `query` fail.
    pub fn set_query_failing(&self, failing: bool) {
        self.lookups.set_failing(failing);
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn matches_filter(record: &VectorRecord, filter: &MetadataFilter) -> bool {
    match filter {
        MetadataFilter::Eq { field, value } => match field.as_str() {
            "file_id" => &record.metadata.file_id == value,
            "text" => &record.metadata.text == value,
            _ => false,
        },
    }
}

#[async_trait::async_trait]
impl VectorIndex for MockVectorIndex {
    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<()> {
        self.upserts.record("upsert")?;
        lock(&self.chunks).push((namespace.to_owned(), records));
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        filter: MetadataFilter,
        vector: Vec<f32>,
        top_k: u32,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        self.lookups.record("query")?;
        lock(&self.queries).push(RecordedQuery {
            namespace: namespace.to_owned(),
            filter: filter.clone(),
            top_k,
            include_metadata,
        });

        if let Some(canned) = lock(&self.canned).clone() {
            return Ok(canned);
        }

        let mut matches: Vec<QueryMatch> = lock(&self.chunks)
            .iter()
            .filter(|(ns, _)| ns == namespace)
            .flat_map(|(_, records)| records.iter())
            .filter(|record| matches_filter(record, &filter))
            .map(|record| QueryMatch {
                id: record.id.to_string(),
                score: cosine(&vector, &record.values),
                metadata: include_metadata.then(|| record.metadata.clone()),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k as usize);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordMetadata;

    #[tokio::test]
    async fn query_filters_and_ranks() -> anyhow::Result<()> {
        let index = MockVectorIndex::new();
        index
            .upsert(
                "paragraphs",
                vec![
                    VectorRecord::new(vec![1.0, 0.0], RecordMetadata::new("near", "a")),
                    VectorRecord::new(vec![0.0, 1.0], RecordMetadata::new("far", "a")),
                    VectorRecord::new(vec![1.0, 0.0], RecordMetadata::new("other", "b")),
                ],
            )
            .await?;

        let matches = index
            .query("paragraphs", MetadataFilter::file_id("a"), vec![1.0, 0.1], 5, true)
            .await?;

        let texts: Vec<_> = matches
            .iter()
            .filter_map(|m| m.metadata.as_ref().map(|meta| meta.text.as_str()))
            .collect();
        assert_eq!(texts, vec!["near", "far"]);
        Ok(())
    }

    #[tokio::test]
    async fn other_namespaces_are_invisible() -> anyhow::Result<()> {
        let index = MockVectorIndex::new();
        index
            .upsert(
                "elsewhere",
                vec![VectorRecord::new(vec![1.0], RecordMetadata::new("x", "a"))],
            )
            .await?;

        let matches = index
            .query("paragraphs", MetadataFilter::file_id("a"), vec![1.0], 5, true)
            .await?;
        assert!(matches.is_empty());
        Ok(())
    }
}
