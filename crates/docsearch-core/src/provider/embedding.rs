use crate::Result;

/// Converts text into fixed-dimension vectors.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds many texts in one round trip.
    ///
    /// The returned vectors are in the same order as `texts`.
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
