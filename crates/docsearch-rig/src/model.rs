//! Type-safe embedding model references.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// OpenAI embedding models.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OpenAiEmbeddingModel {
    /// text-embedding-3-small (1536 dimensions)
    #[strum(serialize = "text-embedding-3-small")]
    #[serde(rename = "text-embedding-3-small")]
    TextEmbedding3Small,
    /// text-embedding-3-large (3072 dimensions)
    #[strum(serialize = "text-embedding-3-large")]
    #[serde(rename = "text-embedding-3-large")]
    TextEmbedding3Large,
    /// text-embedding-ada-002 (legacy, 1536 dimensions)
    #[default]
    #[strum(serialize = "text-embedding-ada-002")]
    #[serde(rename = "text-embedding-ada-002")]
    TextEmbeddingAda002,
}

impl OpenAiEmbeddingModel {
    /// Native output dimensions of the model.
    pub fn dimensions(&self) -> usize {
        match self {
            Self::TextEmbedding3Small => 1536,
            Self::TextEmbedding3Large => 3072,
            Self::TextEmbeddingAda002 => 1536,
        }
    }

    /// Whether the model accepts a reduced `dimensions` request parameter.
    pub fn supports_dimensions(&self) -> bool {
        !matches!(self, Self::TextEmbeddingAda002)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_api_model_names() {
        assert_eq!(
            OpenAiEmbeddingModel::from_str("text-embedding-3-small").unwrap(),
            OpenAiEmbeddingModel::TextEmbedding3Small
        );
        assert_eq!(
            OpenAiEmbeddingModel::from_str("text-embedding-ada-002").unwrap(),
            OpenAiEmbeddingModel::TextEmbeddingAda002
        );
        assert!(OpenAiEmbeddingModel::from_str("gpt-4o").is_err());
    }

    #[test]
    fn renders_api_model_names() {
        assert_eq!(
            OpenAiEmbeddingModel::TextEmbedding3Large.as_ref(),
            "text-embedding-3-large"
        );
        assert_eq!(OpenAiEmbeddingModel::default().dimensions(), 1536);
    }

    #[test]
    fn ada_has_fixed_dimensions() {
        assert!(!OpenAiEmbeddingModel::TextEmbeddingAda002.supports_dimensions());
        assert!(OpenAiEmbeddingModel::TextEmbedding3Small.supports_dimensions());
    }
}
