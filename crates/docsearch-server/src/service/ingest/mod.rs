//! Document ingestion.
//!
//! Turns a batch of signed URLs into vector records: every URL is validated,
//! its OCR fixture is loaded, the paragraphs are embedded in a single batch
//! and the resulting records are upserted in fixed-size chunks.

mod validator;

use std::sync::Arc;

use docsearch_core::types::{RecordMetadata, VectorRecord};
use docsearch_core::{EmbeddingProvider, FixtureSource, VectorIndex};

pub use self::validator::{DEFAULT_STORAGE_DOMAIN, SignedUrlValidator, ValidationError};
use crate::TRACING_TARGET_INGEST;
use crate::service::ServiceConfig;

/// Ingestion failures.
///
/// Client errors mean the request must change before it can succeed.
/// Upstream errors mean a collaborator is unavailable and a retry may help.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No text could be extracted from the given documents.")]
    NoTextExtracted,

    #[error("extraction storage unavailable")]
    FixtureUnavailable(#[source] docsearch_core::Error),

    #[error("embedding provider unavailable")]
    EmbeddingUnavailable(#[source] docsearch_core::Error),

    #[error("vector index unavailable")]
    IndexUnavailable(#[source] docsearch_core::Error),
}

impl IngestError {
    /// Returns `true` when the caller is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NoTextExtracted)
    }

    /// Returns the failing stage for upstream errors.
    #[must_use]
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::FixtureUnavailable(_) => Some("fixture_source"),
            Self::EmbeddingUnavailable(_) => Some("embedding"),
            Self::IndexUnavailable(_) => Some("vector_index"),
            _ => None,
        }
    }
}

/// One extracted paragraph with the document it came from.
///
/// Kept positionally so equal texts from different documents stay apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphRecord {
    pub text: String,
    pub file_id: String,
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents whose fixture contributed paragraphs (or was empty).
    pub files_processed: usize,
    /// Documents skipped because no fixture exists for them.
    pub files_skipped: usize,
    pub records_upserted: usize,
    pub chunks_upserted: usize,
}

/// Ingestion pipeline over injected collaborators.
#[derive(Clone)]
pub struct IngestService {
    validator: SignedUrlValidator,
    fixtures: Arc<dyn FixtureSource>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    bucket: String,
    namespace: String,
    chunk_size: usize,
}

impl std::fmt::Debug for IngestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestService")
            .field("validator", &self.validator)
            .field("bucket", &self.bucket)
            .field("namespace", &self.namespace)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl IngestService {
    /// Creates a pipeline using the bucket, namespace and chunk size of `config`.
    pub fn new(
        config: &ServiceConfig,
        fixtures: Arc<dyn FixtureSource>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            validator: SignedUrlValidator::new(config.storage_domain.clone()),
            fixtures,
            embedder,
            index,
            bucket: config.bucket_name.clone(),
            namespace: config.embedding_namespace.clone(),
            chunk_size: config.embedding_chunk_size.max(1),
        }
    }

    /// Returns the signed URL validator.
    #[inline]
    pub fn validator(&self) -> &SignedUrlValidator {
        &self.validator
    }

    /// Ingests every document referenced by `urls`.
    ///
    /// Any invalid URL aborts the whole batch before a fixture is read.
    /// Absent fixtures are skipped, and a batch made only of absent fixtures
    /// completes with nothing upserted. Fixtures that exist but hold no text
    /// fail with [`IngestError::NoTextExtracted`]. Chunks upserted before an
    /// index failure stay in the index.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_INGEST, fields(urls = urls.len()))]
    pub async fn ingest(&self, urls: &[String]) -> Result<IngestReport, IngestError> {
        let file_ids = urls
            .iter()
            .map(|url| self.validator.validate_and_extract(url, &self.bucket))
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = IngestReport::default();
        let paragraphs = self.collect_paragraphs(&file_ids, &mut report).await?;
        if paragraphs.is_empty() {
            tracing::debug!(
                target: TRACING_TARGET_INGEST,
                files_processed = report.files_processed,
                files_skipped = report.files_skipped,
                "No paragraphs extracted"
            );

            if report.files_processed == 0 {
                return Ok(report);
            }
            return Err(IngestError::NoTextExtracted);
        }

        let texts: Vec<String> = paragraphs.iter().map(|p| p.text.clone()).collect();
        let vectors = self
            .embedder
            .embed_many(&texts)
            .await
            .map_err(IngestError::EmbeddingUnavailable)?;

        if vectors.len() != paragraphs.len() {
            let error = docsearch_core::Error::provider().with_message(format!(
                "expected {} embeddings, received {}",
                paragraphs.len(),
                vectors.len()
            ));
            return Err(IngestError::EmbeddingUnavailable(error));
        }

        let records: Vec<VectorRecord> = paragraphs
            .into_iter()
            .zip(vectors)
            .map(|(paragraph, values)| {
                VectorRecord::new(
                    values,
                    RecordMetadata::new(paragraph.text, paragraph.file_id),
                )
            })
            .collect();

        for chunk in records.chunks(self.chunk_size) {
            self.index
                .upsert(&self.namespace, chunk.to_vec())
                .await
                .map_err(IngestError::IndexUnavailable)?;

            report.records_upserted += chunk.len();
            report.chunks_upserted += 1;
        }

        tracing::info!(
            target: TRACING_TARGET_INGEST,
            files_processed = report.files_processed,
            files_skipped = report.files_skipped,
            records = report.records_upserted,
            chunks = report.chunks_upserted,
            "Documents ingested"
        );

        Ok(report)
    }

    async fn collect_paragraphs(
        &self,
        file_ids: &[String],
        report: &mut IngestReport,
    ) -> Result<Vec<ParagraphRecord>, IngestError> {
        let mut paragraphs = Vec::new();

        for file_id in file_ids {
            let fixture = match self.fixtures.fetch(file_id).await {
                Ok(Some(fixture)) => fixture,
                Ok(None) => {
                    tracing::warn!(
                        target: TRACING_TARGET_INGEST,
                        file_id = %file_id,
                        "No extraction found for document, skipping"
                    );
                    report.files_skipped += 1;
                    continue;
                }
                Err(error) => return Err(IngestError::FixtureUnavailable(error)),
            };

            report.files_processed += 1;
            paragraphs.extend(fixture.texts().map(|text| ParagraphRecord {
                text: text.to_owned(),
                file_id: file_id.clone(),
            }));
        }

        Ok(paragraphs)
    }
}

#[cfg(test)]
mod tests {
    use docsearch_core::mock::{MockEmbedder, MockFixtureSource, MockVectorIndex};
    use jiff::Timestamp;

    use super::*;

    const DOMAIN: &str = "storage.example.com";
    const BUCKET: &str = "expected-bucket";

    struct Harness {
        fixtures: Arc<MockFixtureSource>,
        embedder: Arc<MockEmbedder>,
        index: Arc<MockVectorIndex>,
        service: IngestService,
    }

    fn harness(fixtures: MockFixtureSource, chunk_size: usize) -> anyhow::Result<Harness> {
        let config = ServiceConfig::builder()
            .with_storage_domain(DOMAIN)
            .with_bucket_name(BUCKET)
            .with_embedding_chunk_size(chunk_size)
            .with_jwt_secret_key("test-secret")
            .build()?;

        let fixtures = Arc::new(fixtures);
        let embedder = Arc::new(MockEmbedder::new(4));
        let index = Arc::new(MockVectorIndex::new());
        let service = IngestService::new(
            &config,
            fixtures.clone(),
            embedder.clone(),
            index.clone(),
        );

        Ok(Harness {
            fixtures,
            embedder,
            index,
            service,
        })
    }

    fn signed_url(file_id: &str) -> String {
        let expires = Timestamp::now().as_second() + 3600;
        format!("https://{DOMAIN}/{BUCKET}/{file_id}?Expires={expires}")
    }

    #[tokio::test]
    async fn two_paragraphs_become_two_records() -> anyhow::Result<()> {
        let fixtures =
            MockFixtureSource::new().with_paragraphs("doc.pdf", ["First page", "Second page"]);
        let h = harness(fixtures, 200)?;

        let report = h.service.ingest(&[signed_url("doc.pdf")]).await?;
        assert_eq!(report.records_upserted, 2);
        assert_eq!(report.files_processed, 1);

        let records = h.index.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.metadata.file_id == "doc.pdf"));
        assert_eq!(records[0].metadata.text, "First page");
        assert_eq!(records[1].metadata.text, "Second page");
        assert_eq!(records[0].values, h.embedder.vector_for("First page"));
        assert_ne!(records[0].id, records[1].id);
        Ok(())
    }

    #[tokio::test]
    async fn absent_fixture_is_skipped() -> anyhow::Result<()> {
        let fixtures = MockFixtureSource::new().with_paragraphs("known.pdf", ["Some text"]);
        let h = harness(fixtures, 200)?;

        let report = h
            .service
            .ingest(&[signed_url("missing.pdf"), signed_url("known.pdf")])
            .await?;

        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.files_processed, 1);
        assert_eq!(h.index.records().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn only_absent_fixtures_complete_empty() -> anyhow::Result<()> {
        let h = harness(MockFixtureSource::new(), 200)?;

        let report = h.service.ingest(&[signed_url("missing.pdf")]).await?;

        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.files_processed, 0);
        assert_eq!(report.records_upserted, 0);
        assert_eq!(h.fixtures.fetch_calls(), 1);
        assert_eq!(h.embedder.embed_many_calls(), 0);
        assert_eq!(h.index.upsert_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn blank_fixture_reports_no_text() -> anyhow::Result<()> {
        let fixtures = MockFixtureSource::new().with_paragraphs("blank.pdf", ["", "   "]);
        let h = harness(fixtures, 200)?;

        let err = h
            .service
            .ingest(&[signed_url("blank.pdf"), signed_url("missing.pdf")])
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::NoTextExtracted));
        assert!(err.is_client_error());
        assert_eq!(h.embedder.embed_many_calls(), 0);
        assert_eq!(h.index.upsert_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn fixture_storage_outage_is_upstream() -> anyhow::Result<()> {
        let fixtures = MockFixtureSource::new().with_paragraphs("doc.pdf", ["text"]);
        fixtures.set_failing(true);
        let h = harness(fixtures, 200)?;

        let err = h.service.ingest(&[signed_url("doc.pdf")]).await.unwrap_err();
        assert!(matches!(err, IngestError::FixtureUnavailable(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.stage(), Some("fixture_source"));
        assert_eq!(h.embedder.embed_many_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn surplus_embeddings_are_rejected() -> anyhow::Result<()> {
        let fixtures = MockFixtureSource::new().with_paragraphs("doc.pdf", ["one", "two"]);
        let h = harness(fixtures, 200)?;
        h.embedder.set_surplus(1);

        let err = h.service.ingest(&[signed_url("doc.pdf")]).await.unwrap_err();
        assert!(matches!(err, IngestError::EmbeddingUnavailable(_)));
        assert_eq!(h.index.upsert_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_url_aborts_before_fetching() -> anyhow::Result<()> {
        let fixtures = MockFixtureSource::new().with_paragraphs("doc.pdf", ["text"]);
        let h = harness(fixtures, 200)?;

        let urls = [
            signed_url("doc.pdf"),
            format!("http://{DOMAIN}/{BUCKET}/doc.pdf?Expires=99999999999"),
        ];
        let err = h.service.ingest(&urls).await.unwrap_err();

        assert!(matches!(
            err,
            IngestError::Validation(ValidationError::InsecureScheme)
        ));
        assert!(err.is_client_error());
        assert_eq!(h.fixtures.fetch_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn records_are_chunked_exactly() -> anyhow::Result<()> {
        let texts: Vec<String> = (0..7).map(|i| format!("paragraph {i}")).collect();
        let fixtures = MockFixtureSource::new().with_paragraphs("doc.pdf", texts.clone());
        let h = harness(fixtures, 3)?;

        let report = h.service.ingest(&[signed_url("doc.pdf")]).await?;
        assert_eq!(report.chunks_upserted, 3);

        let chunks = h.index.chunks();
        let sizes: Vec<usize> = chunks.iter().map(|(_, records)| records.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert!(chunks.iter().all(|(namespace, _)| namespace == "paragraphs"));

        let upserted: Vec<String> = h
            .index
            .records()
            .into_iter()
            .map(|r| r.metadata.text)
            .collect();
        assert_eq!(upserted, texts);

        assert_eq!(h.embedder.embed_many_calls(), 1);
        assert_eq!(h.embedder.batches()[0], texts);
        Ok(())
    }

    #[tokio::test]
    async fn exact_multiple_has_no_trailing_chunk() -> anyhow::Result<()> {
        let texts: Vec<String> = (0..4).map(|i| format!("p{i}")).collect();
        let fixtures = MockFixtureSource::new().with_paragraphs("doc.pdf", texts);
        let h = harness(fixtures, 2)?;

        h.service.ingest(&[signed_url("doc.pdf")]).await?;
        assert_eq!(h.index.upsert_calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn equal_text_keeps_each_file_id() -> anyhow::Result<()> {
        let fixtures = MockFixtureSource::new()
            .with_paragraphs("a.pdf", ["Shared disclaimer", "Only in a"])
            .with_paragraphs("b.pdf", ["Shared disclaimer"]);
        let h = harness(fixtures, 200)?;

        h.service
            .ingest(&[signed_url("a.pdf"), signed_url("b.pdf")])
            .await?;

        let shared: Vec<String> = h
            .index
            .records()
            .into_iter()
            .filter(|r| r.metadata.text == "Shared disclaimer")
            .map(|r| r.metadata.file_id)
            .collect();
        assert_eq!(shared, vec!["a.pdf".to_owned(), "b.pdf".to_owned()]);
        Ok(())
    }

    #[tokio::test]
    async fn embedding_failure_is_upstream() -> anyhow::Result<()> {
        let fixtures = MockFixtureSource::new().with_paragraphs("doc.pdf", ["text"]);
        let h = harness(fixtures, 200)?;
        h.embedder.set_failing(true);

        let err = h.service.ingest(&[signed_url("doc.pdf")]).await.unwrap_err();
        assert!(matches!(err, IngestError::EmbeddingUnavailable(_)));
        assert!(!err.is_client_error());
        assert_eq!(err.stage(), Some("embedding"));
        assert_eq!(h.index.upsert_calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn index_failure_is_upstream() -> anyhow::Result<()> {
        let fixtures = MockFixtureSource::new().with_paragraphs("doc.pdf", ["one", "two"]);
        let h = harness(fixtures, 1)?;
        h.index.set_upsert_failing(true);

        let err = h.service.ingest(&[signed_url("doc.pdf")]).await.unwrap_err();
        assert!(matches!(err, IngestError::IndexUnavailable(_)));
        assert_eq!(err.stage(), Some("vector_index"));
        assert_eq!(h.index.upsert_calls(), 1);
        Ok(())
    }
}
