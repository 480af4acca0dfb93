//! Document upload policy and storage.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use docsearch_core::DocumentStore;
use url::Url;
use uuid::Uuid;

use crate::TRACING_TARGET_UPLOAD;
use crate::service::ServiceConfig;

/// Content types accepted for upload.
pub const SUPPORTED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/tiff",
    "application/pdf",
];

/// Upload failures.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Maximum number of valid files: {max}")]
    TooManyFiles { max: usize },

    #[error("No files were provided.")]
    NoFiles,

    #[error("Invalid file no extension: {filename}")]
    MissingExtension { filename: String },

    #[error("Valid types supported: {}", supported_extensions().join(", "))]
    UnsupportedType,

    #[error("File size too large for file {filename}")]
    TooLarge { filename: String },

    #[error("document storage unavailable")]
    Storage(#[source] docsearch_core::Error),
}

impl UploadError {
    /// Returns `true` when the caller is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Extensions matching [`SUPPORTED_CONTENT_TYPES`], in the same order.
pub fn supported_extensions() -> Vec<&'static str> {
    SUPPORTED_CONTENT_TYPES
        .iter()
        .filter_map(|content_type| content_type.rsplit('/').next())
        .collect()
}

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A stored document with a time-limited read URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    /// Filename as sent by the client.
    pub filename: String,
    /// Object name in storage.
    pub file_id: String,
    pub presigned_url: Url,
}

/// Limits applied to an upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_files: usize,
    pub max_bytes: u64,
}

impl UploadPolicy {
    /// Checks the batch size and then every file in order.
    pub fn check(&self, files: &[IncomingFile]) -> Result<(), UploadError> {
        if files.len() > self.max_files {
            return Err(UploadError::TooManyFiles {
                max: self.max_files,
            });
        }
        if files.is_empty() {
            return Err(UploadError::NoFiles);
        }

        files.iter().try_for_each(|file| self.check_file(file))
    }

    fn check_file(&self, file: &IncomingFile) -> Result<(), UploadError> {
        let Some((_, extension)) = file.filename.rsplit_once('.') else {
            return Err(UploadError::MissingExtension {
                filename: file.filename.clone(),
            });
        };

        let content_type = file.content_type.to_ascii_lowercase();
        let extension = extension.to_ascii_lowercase();
        if !SUPPORTED_CONTENT_TYPES.contains(&content_type.as_str())
            || !supported_extensions().contains(&extension.as_str())
        {
            return Err(UploadError::UnsupportedType);
        }

        if file.data.len() as u64 > self.max_bytes {
            return Err(UploadError::TooLarge {
                filename: file.filename.clone(),
            });
        }

        Ok(())
    }
}

/// Reduces a client filename to a safe object name.
///
/// Path separators and whitespace become underscores, everything outside
/// ASCII alphanumerics, `.`, `-` and `_` is dropped, and leading or trailing
/// dots and underscores are removed.
pub fn sanitize_filename(filename: &str) -> String {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let trimmed = kept.trim_matches(['.', '_']);
    if trimmed.is_empty() {
        "document".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Validates uploads, writes them to storage and presigns read URLs.
#[derive(Clone)]
pub struct UploadService {
    policy: UploadPolicy,
    documents: Arc<dyn DocumentStore>,
    url_ttl: Duration,
}

impl std::fmt::Debug for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadService")
            .field("policy", &self.policy)
            .field("url_ttl", &self.url_ttl)
            .finish_non_exhaustive()
    }
}

impl UploadService {
    pub fn new(config: &ServiceConfig, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            policy: UploadPolicy {
                max_files: config.max_file_upload_count,
                max_bytes: config.max_file_bytes_size,
            },
            documents,
            url_ttl: Duration::from_secs(config.storage_expire_minutes * 60),
        }
    }

    #[inline]
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Stores every file once the whole batch passed the policy.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_UPLOAD, fields(files = files.len()))]
    pub async fn upload(&self, files: Vec<IncomingFile>) -> Result<Vec<StoredDocument>, UploadError> {
        self.policy.check(&files)?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let file_id = format!("{}_{}", Uuid::new_v4(), sanitize_filename(&file.filename));
            let content_type = file.content_type.to_ascii_lowercase();

            self.documents
                .put(&file_id, file.data, &content_type)
                .await
                .map_err(UploadError::Storage)?;

            let presigned_url = self
                .documents
                .presign_read(&file_id, self.url_ttl)
                .await
                .map_err(UploadError::Storage)?;

            tracing::debug!(
                target: TRACING_TARGET_UPLOAD,
                file_id = %file_id,
                "Document stored"
            );

            stored.push(StoredDocument {
                filename: file.filename,
                file_id,
                presigned_url,
            });
        }

        tracing::info!(target: TRACING_TARGET_UPLOAD, files = stored.len(), "Documents uploaded");
        Ok(stored)
    }
}
