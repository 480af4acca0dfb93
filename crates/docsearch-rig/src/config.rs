//! OpenAI embedding configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, OpenAiEmbeddingModel, Result};

/// Configuration for the OpenAI embedding provider.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct OpenAiConfig {
    /// OpenAI API key.
    #[cfg_attr(
        feature = "config",
        arg(id = "openai_api_key", long = "openai-api-key", env = "OPENAI_API_KEY")
    )]
    pub api_key: String,

    /// Embedding model name.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "openai-embedding-model",
            env = "OPENAI_EMBEDDING_MODEL",
            default_value = "text-embedding-ada-002"
        )
    )]
    #[serde(default)]
    pub embedding_model: OpenAiEmbeddingModel,

    /// Requested output dimensions, for models that support shortening.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "openai-embeddings-dimensions",
            env = "OPENAI_EMBEDDINGS_DIMENSIONS"
        )
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
}

impl OpenAiConfig {
    /// Creates a configuration for the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            embedding_model: OpenAiEmbeddingModel::default(),
            dimensions: None,
        }
    }

    /// Sets the embedding model.
    #[must_use]
    pub fn with_model(mut self, model: OpenAiEmbeddingModel) -> Self {
        self.embedding_model = model;
        self
    }

    /// Sets the requested output dimensions.
    #[must_use]
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Dimensions of the vectors this configuration produces.
    pub fn effective_dimensions(&self) -> usize {
        self.dimensions
            .unwrap_or_else(|| self.embedding_model.dimensions())
    }

    /// Checks the key and the requested dimensions against the model.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config("OpenAI API key cannot be empty"));
        }

        if let Some(dimensions) = self.dimensions {
            let native = self.embedding_model.dimensions();
            if dimensions == 0 || dimensions > native {
                return Err(Error::config(format!(
                    "dimensions must be between 1 and {native} for {}",
                    self.embedding_model.as_ref()
                )));
            }
            if dimensions != native && !self.embedding_model.supports_dimensions() {
                return Err(Error::config(format!(
                    "{} does not support custom dimensions",
                    self.embedding_model.as_ref()
                )));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("embedding_model", &self.embedding_model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}
