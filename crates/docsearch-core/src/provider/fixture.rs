use crate::Result;
use crate::types::OcrFixture;

/// Source of OCR extraction output, keyed by document identifier.
#[async_trait::async_trait]
pub trait FixtureSource: Send + Sync {
    /// Returns the extraction output for `file_id`, or `None` if there is none.
    async fn fetch(&self, file_id: &str) -> Result<Option<OcrFixture>>;
}
