#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for mock collaborator operations.
#[cfg(any(test, feature = "test-utils"))]
pub const TRACING_TARGET_MOCK: &str = "docsearch_core::mock";

mod error;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod provider;
pub mod types;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use provider::{
    AccountStore, DocumentStore, EmbeddingProvider, FixtureSource, SearchCache, VectorIndex,
};
