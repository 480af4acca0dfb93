use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::Result;

/// Object storage for uploaded documents.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Writes `data` under the object name `name`.
    async fn put(&self, name: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Returns a time-limited URL granting read access to `name`.
    async fn presign_read(&self, name: &str, expires_in: Duration) -> Result<Url>;
}
