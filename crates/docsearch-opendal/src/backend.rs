//! Storage backend implementation.

use std::time::Duration;

use bytes::Bytes;
use jiff::Timestamp;
use opendal::{Operator, services};
use url::Url;

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Unified storage backend that wraps an OpenDAL operator.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("backend", &self.config.backend)
            .field("root", &self.config.root)
            .field("bucket", &self.config.bucket)
            .finish_non_exhaustive()
    }
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        config.validate()?;
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = %config.backend,
            root = %config.root,
            bucket = ?config.bucket,
            "Storage backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the backend type.
    pub fn backend_type(&self) -> BackendType {
        self.config.backend
    }

    /// Reads an object from storage.
    pub async fn read(&self, path: &str) -> StorageResult<Bytes> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            "Reading object"
        );

        let data = self.operator.read(path).await?.to_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "Object read complete"
        );

        Ok(data)
    }

    /// Writes an object, recording its content type when the service supports it.
    pub async fn write(&self, path: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        let size = data.len();
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size,
            content_type,
            "Writing object"
        );

        if self.operator.info().full_capability().write_with_content_type {
            self.operator
                .write_with(path, data)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(path, data).await?;
        }

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size,
            "Object write complete"
        );

        Ok(())
    }

    /// Checks if an object exists.
    pub async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(path).await?)
    }

    /// Deletes an object.
    pub async fn delete(&self, path: &str) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            "Deleting object"
        );

        self.operator.delete(path).await?;
        Ok(())
    }

    /// Returns a time-limited read URL for an object.
    ///
    /// Services with native presigning sign the request. Otherwise the URL is
    /// built from `public_base_url` with an `Expires` unix timestamp.
    pub async fn presign_read(&self, path: &str, expires_in: Duration) -> StorageResult<Url> {
        if self.operator.info().full_capability().presign_read {
            let request = self.operator.presign_read(path, expires_in).await?;
            let uri = request.uri().to_string();
            return Url::parse(&uri)
                .map_err(|e| StorageError::invalid_path(format!("presigned uri '{uri}': {e}")));
        }

        let base = self.config.public_base_url.as_deref().ok_or_else(|| {
            StorageError::init(format!(
                "{} backend cannot presign and no public base URL is configured",
                self.config.backend
            ))
        })?;

        let expires_at = expiry_timestamp(Timestamp::now(), expires_in);
        public_read_url(base, path, expires_at)
    }

    /// Creates an OpenDAL operator based on configuration.
    fn create_operator(config: &StorageConfig) -> StorageResult<Operator> {
        match config.backend {
            BackendType::Memory => {
                let builder = services::Memory::default().root(&config.root);

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "fs")]
            BackendType::Fs => {
                let builder = services::Fs::default().root(&config.root);

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "gcs")]
            BackendType::Gcs => {
                let bucket = config.bucket.as_deref().unwrap_or_default();
                let mut builder = services::Gcs::default().bucket(bucket).root(&config.root);

                if let Some(ref path) = config.credential_path {
                    builder = builder.credential_path(path);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[allow(unreachable_patterns)]
            other => Err(StorageError::init(format!(
                "storage backend '{other}' is not enabled in this build"
            ))),
        }
    }
}

fn expiry_timestamp(now: Timestamp, expires_in: Duration) -> i64 {
    let ttl = i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX);
    now.as_second().saturating_add(ttl)
}

fn public_read_url(base: &str, path: &str, expires_at: i64) -> StorageResult<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| StorageError::init(format!("invalid public base URL '{base}': {e}")))?;

    url.path_segments_mut()
        .map_err(|()| StorageError::init(format!("public base URL '{base}' cannot be a base")))?
        .pop_if_empty()
        .extend(path.split('/').filter(|segment| !segment.is_empty()));

    url.query_pairs_mut()
        .append_pair("Expires", &expires_at.to_string());

    Ok(url)
}
