//! Uploaded document storage.

use std::time::Duration;

use bytes::Bytes;
use docsearch_core::{DocumentStore, Result};
use url::Url;

use crate::backend::StorageBackend;
use crate::error::StorageError;
use crate::TRACING_TARGET;

/// Stores uploaded documents at the bucket root and hands out read links.
#[derive(Debug, Clone)]
pub struct ObjectDocumentStore {
    backend: StorageBackend,
}

impl ObjectDocumentStore {
    /// Creates a document store on top of `backend`.
    pub fn new(backend: StorageBackend) -> Self {
        Self { backend }
    }

    /// Returns the underlying storage backend.
    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }
}

#[async_trait::async_trait]
impl DocumentStore for ObjectDocumentStore {
    async fn put(&self, name: &str, data: Bytes, content_type: &str) -> Result<()> {
        if name.is_empty() || name.contains('/') {
            return Err(StorageError::invalid_path(format!("invalid object name '{name}'")).into());
        }

        let size = data.len();
        self.backend.write(name, data, content_type).await?;

        tracing::info!(
            target: TRACING_TARGET,
            object = %name,
            size,
            content_type,
            "Document stored"
        );
        Ok(())
    }

    async fn presign_read(&self, name: &str, expires_in: Duration) -> Result<Url> {
        if !self.backend.exists(name).await? {
            return Err(StorageError::not_found(name).into());
        }

        let url = self.backend.presign_read(name, expires_in).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            object = %name,
            expires_in_secs = expires_in.as_secs(),
            "Read link issued"
        );
        Ok(url)
    }
}
