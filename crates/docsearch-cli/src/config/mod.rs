//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig         # Host, port, shutdown
//! ├── middleware: MiddlewareConfig # CORS, OpenAPI, recovery, client IP
//! ├── service: ServiceConfig       # Bucket, limits, tokens, rate limits
//! ├── nats: NatsConfig             # Search cache and accounts
//! ├── pinecone: PineconeConfig     # Vector index
//! ├── openai: OpenAiConfig         # Embeddings
//! └── storage: StorageConfig       # Uploads and OCR results
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! docsearch --jwt-secret-key "..." --port 8080
//!
//! # Or via environment variables
//! JWT_SECRET_KEY="..." PORT=8080 docsearch
//! ```

mod middleware;
mod provider;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use docsearch_nats::NatsConfig;
use docsearch_opendal::StorageConfig;
use docsearch_rig::OpenAiConfig;
use docsearch_server::service::ServiceConfig;
use docsearch_vector::PineconeConfig;
pub use middleware::MiddlewareConfig;
pub use provider::create_dependencies;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "docsearch")]
#[command(about = "Document OCR ingestion and semantic search server")]
#[command(version)]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    #[serde(default)]
    pub log_json: bool,

    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Pipelines, upload policy, tokens and rate limits.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// NATS connection backing the search cache and account store.
    #[clap(flatten)]
    pub nats: NatsConfig,

    /// Pinecone vector index.
    #[clap(flatten)]
    pub pinecone: PineconeConfig,

    /// OpenAI embeddings.
    #[clap(flatten)]
    pub openai: OpenAiConfig,

    /// Object storage for uploads and OCR results.
    #[clap(flatten)]
    pub storage: StorageConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its values
    /// act as defaults for the `env` attributes.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with `RUST_LOG` filtering, falling back to `info`.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        if self.log_json {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }

    /// Validates every configuration group before any connection is made.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.service
            .validate()
            .context("invalid service configuration")?;
        self.nats.validate().context("invalid NATS configuration")?;
        self.pinecone
            .validate()
            .context("invalid Pinecone configuration")?;
        self.openai
            .validate()
            .context("invalid OpenAI configuration")?;
        self.storage
            .validate()
            .context("invalid storage configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            bucket = %self.service.bucket_name,
            storage_domain = %self.service.storage_domain,
            namespace = %self.service.embedding_namespace,
            chunk_size = self.service.embedding_chunk_size,
            cache_ttl_secs = self.service.cache_ttl_seconds,
            top_k = self.service.search_top_k,
            max_files = self.service.max_file_upload_count,
            max_file_bytes = self.service.max_file_bytes_size,
            ocr_rate_per_minute = self.service.ocr_rate_per_minute,
            ocr_rate_per_hour = self.service.ocr_rate_per_hour,
            "Service configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            nats_url = %self.nats.nats_url,
            pinecone_host = ?self.pinecone.host,
            pinecone_index = ?self.pinecone.index,
            embedding_model = self.openai.embedding_model.as_ref(),
            embedding_dimensions = self.openai.effective_dimensions(),
            storage_backend = %self.storage.backend,
            storage_root = %self.storage.root,
            "Backend configuration"
        );
    }

    fn log_build_info() {
        tracing::info!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            "starting docsearch server"
        );

        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
