#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::error::{Error, ErrorKind, Result};

/// Token validation and issuance.
pub const TRACING_TARGET_AUTHENTICATION: &str = "docsearch_server::authentication";

/// Signed URL validation and the ingestion pipeline.
pub const TRACING_TARGET_INGEST: &str = "docsearch_server::ingest";

/// Cache-fronted semantic search.
pub const TRACING_TARGET_SEARCH: &str = "docsearch_server::search";

/// Document upload policy and storage.
pub const TRACING_TARGET_UPLOAD: &str = "docsearch_server::upload";

/// Password hashing and verification.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "docsearch_server::password_hasher";

/// Per-client request rate limiting.
pub const TRACING_TARGET_RATE_LIMITER: &str = "docsearch_server::rate_limiter";

/// Error recovery including middleware errors and request timeouts.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "docsearch_server::recovery::error";

/// Panic recovery in handlers.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "docsearch_server::recovery::panic";

/// Service state construction.
pub const TRACING_TARGET_SERVICE: &str = "docsearch_server::service";
