#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod embedder;
mod error;
mod model;

pub use config::OpenAiConfig;
pub use embedder::RigEmbedder;
pub use error::{Error, Result};
pub use model::OpenAiEmbeddingModel;

/// Tracing target for the main library.
pub const TRACING_TARGET: &str = "docsearch_rig";
