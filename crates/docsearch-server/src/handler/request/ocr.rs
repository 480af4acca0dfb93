//! OCR ingestion request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request payload for OCR ingestion.
///
/// Accepts either `{"urls": [...]}` or the single-URL form `{"url": "..."}`.
#[must_use]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IngestDocuments {
    /// Signed URLs of the uploaded documents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,

    /// Single signed URL, merged into `urls`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl IngestDocuments {
    /// Returns every URL of the request, `urls` first.
    pub fn into_urls(self) -> Vec<String> {
        let mut urls = self.urls;
        urls.extend(self.url);
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_url_alias_is_merged() -> anyhow::Result<()> {
        let request: IngestDocuments =
            serde_json::from_str(r#"{"url": "https://storage.googleapis.com/b/f.pdf"}"#)?;
        assert_eq!(
            request.into_urls(),
            vec!["https://storage.googleapis.com/b/f.pdf".to_owned()]
        );
        Ok(())
    }

    #[test]
    fn empty_body_has_no_urls() -> anyhow::Result<()> {
        let request: IngestDocuments = serde_json::from_str("{}")?;
        assert!(request.into_urls().is_empty());
        Ok(())
    }
}
