#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod config;
mod document;
mod error;
mod fixture;

pub use backend::StorageBackend;
pub use config::{BackendType, StorageConfig};
pub use document::ObjectDocumentStore;
pub use error::{StorageError, StorageResult};
pub use fixture::FixtureStore;

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "docsearch_opendal";
