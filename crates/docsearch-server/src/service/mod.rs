//! Application state and dependency injection.

mod config;
mod ingest;
mod search;
mod security;
mod upload;

use std::sync::Arc;

use docsearch_core::{
    AccountStore, DocumentStore, EmbeddingProvider, FixtureSource, SearchCache, VectorIndex,
};

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::ingest::{
    DEFAULT_STORAGE_DOMAIN, IngestError, IngestReport, IngestService, ParagraphRecord,
    SignedUrlValidator, ValidationError,
};
pub use crate::service::search::{MatchResult, SearchError, SearchService, cache_key};
pub use crate::service::security::{
    PasswordHasher, RateLimitConfig, RateLimitExceeded, RateLimitKey, RateLimiter, SessionKeys,
    TokenClaims,
};
pub use crate::service::upload::{
    IncomingFile, SUPPORTED_CONTENT_TYPES, StoredDocument, UploadError, UploadPolicy,
    UploadService, sanitize_filename, supported_extensions,
};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};
use crate::TRACING_TARGET_SERVICE;

/// Account persistence shared by the authentication handlers.
pub type AccountRepository = Arc<dyn AccountStore>;

/// External collaborators constructed once at startup.
#[derive(Clone)]
pub struct ServiceDependencies {
    pub cache: Arc<dyn SearchCache>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub index: Arc<dyn VectorIndex>,
    pub fixtures: Arc<dyn FixtureSource>,
    pub accounts: AccountRepository,
    pub documents: Arc<dyn DocumentStore>,
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // Pipelines:
    ingest: IngestService,
    search: SearchService,
    upload: UploadService,

    // Accounts:
    accounts: AccountRepository,
    password_hasher: PasswordHasher,
    session_keys: SessionKeys,

    // Abuse protection:
    ocr_rate_limiter: RateLimiter,
}

impl ServiceState {
    /// Validates `config` and wires the pipelines to `dependencies`.
    pub fn from_dependencies(
        config: &ServiceConfig,
        dependencies: ServiceDependencies,
    ) -> Result<Self> {
        config.validate()?;

        let ServiceDependencies {
            cache,
            embedder,
            index,
            fixtures,
            accounts,
            documents,
        } = dependencies;

        let service_state = Self {
            ingest: IngestService::new(config, fixtures, embedder.clone(), index.clone()),
            search: SearchService::new(config, cache, embedder, index),
            upload: UploadService::new(config, documents),

            accounts,
            password_hasher: PasswordHasher::new(),
            session_keys: SessionKeys::from_secret(
                &config.jwt_secret_key,
                config.token_expire_minutes,
            ),

            ocr_rate_limiter: RateLimiter::per_minute_and_hour(
                config.ocr_rate_per_minute,
                config.ocr_rate_per_hour,
            ),
        };

        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            bucket = %config.bucket_name,
            namespace = %config.embedding_namespace,
            chunk_size = config.embedding_chunk_size,
            "Service state created"
        );

        Ok(service_state)
    }

    #[inline]
    pub fn session_keys(&self) -> &SessionKeys {
        &self.session_keys
    }

    #[inline]
    pub fn ocr_rate_limiter(&self) -> &RateLimiter {
        &self.ocr_rate_limiter
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(ingest: IngestService);
impl_di!(search: SearchService);
impl_di!(upload: UploadService);

impl_di!(accounts: AccountRepository);
impl_di!(password_hasher: PasswordHasher);
impl_di!(session_keys: SessionKeys);

impl_di!(ocr_rate_limiter: RateLimiter);
