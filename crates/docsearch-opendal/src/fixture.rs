//! OCR output lookup.

use docsearch_core::types::OcrFixture;
use docsearch_core::{FixtureSource, Result};

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use crate::TRACING_TARGET;

/// Reads OCR results stored as `<prefix>/<file_id>` JSON documents.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    backend: StorageBackend,
    prefix: String,
}

impl FixtureStore {
    /// Creates a fixture store using the configured OCR prefix.
    pub fn new(backend: StorageBackend) -> Self {
        let prefix = backend.config().fixture_prefix.clone();
        Self::with_prefix(backend, prefix)
    }

    /// Creates a fixture store reading under `prefix`.
    pub fn with_prefix(backend: StorageBackend, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_owned();
        Self { backend, prefix }
    }

    /// Returns the object path for a file identifier.
    pub fn path_for(&self, file_id: &str) -> StorageResult<String> {
        if file_id.is_empty() || file_id.contains('/') || file_id.contains("..") {
            return Err(StorageError::invalid_path(format!(
                "invalid file identifier '{file_id}'"
            )));
        }

        if self.prefix.is_empty() {
            Ok(file_id.to_owned())
        } else {
            Ok(format!("{}/{file_id}", self.prefix))
        }
    }

    async fn load(&self, file_id: &str) -> StorageResult<Option<OcrFixture>> {
        let path = self.path_for(file_id)?;

        let raw = match self.backend.read(&path).await {
            Ok(raw) => raw,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        let fixture = OcrFixture::from_analyze_result(&raw)
            .map_err(|e| StorageError::invalid_content(format!("{path}: {e}")))?;
        Ok(Some(fixture))
    }
}

#[async_trait::async_trait]
impl FixtureSource for FixtureStore {
    #[tracing::instrument(skip(self), target = TRACING_TARGET)]
    async fn fetch(&self, file_id: &str) -> Result<Option<OcrFixture>> {
        let fixture = self.load(file_id).await?;

        match &fixture {
            Some(found) => tracing::debug!(
                target: TRACING_TARGET,
                file_id,
                paragraphs = found.paragraphs.len(),
                "OCR output loaded"
            ),
            None => tracing::debug!(target: TRACING_TARGET, file_id, "No OCR output stored"),
        }

        Ok(fixture)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use docsearch_core::ErrorKind;

    use super::*;
    use crate::StorageConfig;

    async fn store_with(file_id: &str, body: &'static [u8]) -> anyhow::Result<FixtureStore> {
        let backend = StorageBackend::new(StorageConfig::memory())?;
        backend
            .write(&format!("ocr/{file_id}"), Bytes::from_static(body), "application/json")
            .await?;
        Ok(FixtureStore::new(backend))
    }

    #[tokio::test]
    async fn fetches_stored_paragraphs() -> anyhow::Result<()> {
        let store = store_with(
            "invoice.pdf",
            br#"{"analyzeResult":{"paragraphs":[{"content":"Total due"},{"content":"42 EUR"}]}}"#,
        )
        .await?;

        let fixture = store.fetch("invoice.pdf").await?.expect("fixture present");
        assert_eq!(fixture.texts().collect::<Vec<_>>(), vec!["Total due", "42 EUR"]);
        Ok(())
    }

    #[tokio::test]
    async fn absent_fixture_is_none() -> anyhow::Result<()> {
        let store = store_with("a.pdf", br#"{"analyzeResult":{"paragraphs":[]}}"#).await?;
        assert!(store.fetch("b.pdf").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_fixture_is_a_serialization_error() -> anyhow::Result<()> {
        let store = store_with("broken.pdf", b"not json").await?;

        let err = store.fetch("broken.pdf").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_traversal() -> anyhow::Result<()> {
        let store = FixtureStore::new(StorageBackend::new(StorageConfig::memory())?);

        let err = store.fetch("../secrets").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        Ok(())
    }

    #[test]
    fn prefix_is_normalized() -> anyhow::Result<()> {
        let backend = StorageBackend::new(StorageConfig::memory())?;
        let store = FixtureStore::with_prefix(backend.clone(), "/results/");
        assert_eq!(store.path_for("x.png")?, "results/x.png");

        let bare = FixtureStore::with_prefix(backend, "");
        assert_eq!(bare.path_for("x.png")?, "x.png");
        Ok(())
    }
}
