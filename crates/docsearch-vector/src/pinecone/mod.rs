//! Pinecone vector index backend.

mod backend;
mod config;
mod convert;

pub use backend::PineconeIndex;
pub use config::PineconeConfig;
