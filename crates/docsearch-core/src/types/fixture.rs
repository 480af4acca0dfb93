//! OCR extraction output as stored by the document analysis engine.

use serde::{Deserialize, Serialize};

use crate::Result;

/// A paragraph detected by the OCR engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub content: Option<String>,
}

/// Paragraphs extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrFixture {
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Deserialize)]
struct AnalyzeEnvelope {
    #[serde(rename = "analyzeResult")]
    analyze_result: OcrFixture,
}

impl OcrFixture {
    /// Creates a fixture from plain paragraph texts.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paragraphs = texts
            .into_iter()
            .map(|text| Paragraph {
                content: Some(text.into()),
            })
            .collect();
        Self { paragraphs }
    }

    /// Parses the `{"analyzeResult": {"paragraphs": [...]}}` document layout.
    pub fn from_analyze_result(bytes: &[u8]) -> Result<Self> {
        let envelope: AnalyzeEnvelope = serde_json::from_slice(bytes)?;
        Ok(envelope.analyze_result)
    }

    /// Iterates over paragraph texts that carry visible content, in document order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.paragraphs
            .iter()
            .filter_map(|p| p.content.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_result_layout() -> anyhow::Result<()> {
        let raw = br#"{
            "analyzeResult": {
                "apiVersion": "2023-07-31",
                "paragraphs": [
                    { "content": "First paragraph", "role": "title" },
                    { "content": "" },
                    { "spans": [] },
                    { "content": "Second paragraph" }
                ]
            }
        }"#;

        let fixture = OcrFixture::from_analyze_result(raw)?;
        assert_eq!(fixture.paragraphs.len(), 4);
        assert_eq!(
            fixture.texts().collect::<Vec<_>>(),
            vec!["First paragraph", "Second paragraph"]
        );
        Ok(())
    }

    #[test]
    fn missing_envelope_is_rejected() {
        let raw = br#"{ "paragraphs": [] }"#;
        assert!(OcrFixture::from_analyze_result(raw).is_err());
    }

    #[test]
    fn whitespace_only_paragraphs_are_skipped() {
        let fixture = OcrFixture::from_texts(["  ", "\n", "kept"]);
        assert_eq!(fixture.texts().collect::<Vec<_>>(), vec!["kept"]);
    }
}
