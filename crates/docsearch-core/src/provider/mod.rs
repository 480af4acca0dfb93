//! Collaborator contracts consumed by the ingestion and search pipelines.
//!
//! Every trait is object safe and `Send + Sync`, so implementations are
//! constructed once at startup and shared as `Arc<dyn Trait>`.

mod account;
mod cache;
mod document;
mod embedding;
mod fixture;
mod index;

pub use account::AccountStore;
pub use cache::SearchCache;
pub use document::DocumentStore;
pub use embedding::EmbeddingProvider;
pub use fixture::FixtureSource;
pub use index::VectorIndex;
