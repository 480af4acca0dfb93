#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod pinecone;

mod error;

pub use error::{VectorError, VectorResult};
pub use pinecone::{PineconeConfig, PineconeIndex};

/// Tracing target for vector index operations.
pub const TRACING_TARGET: &str = "docsearch_vector";
