//! OpenAI embeddings through rig.

use docsearch_core::{EmbeddingProvider, Result as CoreResult};
use rig::embeddings::{Embedding, EmbeddingModel as RigEmbeddingModel};
use rig::prelude::EmbeddingsClient;
use rig::providers::openai;

use crate::{Error, OpenAiConfig, Result, TRACING_TARGET};

/// Maximum number of inputs sent in one embeddings request.
pub(crate) const MAX_DOCUMENTS_PER_REQUEST: usize = 512;

const PROVIDER: &str = "openai";

/// Embedding generator backed by an OpenAI embedding model.
#[derive(Clone)]
pub struct RigEmbedder {
    model: openai::EmbeddingModel,
    model_name: String,
    dimensions: usize,
}

impl RigEmbedder {
    /// Builds the OpenAI client and model from `config`.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        config.validate()?;

        let client = openai::Client::new(&config.api_key)
            .map_err(|e| Error::provider(PROVIDER, e.to_string()))?;
        let model_name = config.embedding_model.as_ref();
        let model = match config.dimensions {
            Some(ndims) => client.embedding_model_with_ndims(model_name, ndims),
            None => client.embedding_model(model_name),
        };

        tracing::info!(
            target: TRACING_TARGET,
            model = model_name,
            dimensions = config.effective_dimensions(),
            "Embedding provider initialized"
        );

        Ok(Self {
            model,
            model_name: model_name.to_owned(),
            dimensions: config.effective_dimensions(),
        })
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the dimensions of produced vectors.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self
            .model
            .embed_texts(texts.iter().cloned())
            .await
            .map_err(|e| Error::provider(PROVIDER, e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(Error::embedding(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                embeddings.len()
            )));
        }

        Ok(embeddings.into_iter().map(to_f32).collect())
    }
}

impl std::fmt::Debug for RigEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigEmbedder")
            .field("model", &self.model_name)
            .field("ndims", &self.model.ndims())
            .finish()
    }
}

/// Narrows a rig embedding to the `f32` vectors stored in the index.
fn to_f32(embedding: Embedding) -> Vec<f32> {
    embedding.vec.into_iter().map(|v| v as f32).collect()
}

#[async_trait::async_trait]
impl EmbeddingProvider for RigEmbedder {
    async fn embed_one(&self, text: &str) -> CoreResult<Vec<f32>> {
        let embedding = self
            .model
            .embed_text(text)
            .await
            .map_err(|e| Error::provider(PROVIDER, e.to_string()))?;
        Ok(to_f32(embedding))
    }

    async fn embed_many(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for (batch, chunk) in texts.chunks(MAX_DOCUMENTS_PER_REQUEST).enumerate() {
            tracing::debug!(
                target: TRACING_TARGET,
                batch,
                size = chunk.len(),
                "Requesting embeddings"
            );
            vectors.extend(self.embed_batch(chunk).await?);
        }
        Ok(vectors)
    }
}
