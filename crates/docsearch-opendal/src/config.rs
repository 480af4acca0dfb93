//! Storage configuration types.

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::{StorageError, StorageResult};

/// Object storage service backing the document and OCR stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BackendType {
    /// Process-local memory, lost on restart.
    Memory,
    /// Local filesystem under `root`.
    #[default]
    Fs,
    /// Google Cloud Storage bucket.
    Gcs,
}

/// Storage configuration shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Storage service to use.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-backend", env = "STORAGE_BACKEND", value_enum, default_value_t = BackendType::Fs)
    )]
    #[serde(default)]
    pub backend: BackendType,

    /// Root directory (fs) or key prefix (memory, gcs).
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-root", env = "STORAGE_ROOT", default_value = "./data")
    )]
    pub root: String,

    /// Bucket holding uploads and OCR output.
    #[cfg_attr(feature = "config", arg(long = "storage-bucket", env = "STORAGE_BUCKET"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Service account credential file for GCS.
    #[cfg_attr(
        feature = "config",
        arg(long = "gcs-credential-path", env = "GCS_CREDENTIAL_PATH")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_path: Option<String>,

    /// Key prefix under which OCR results are stored.
    #[cfg_attr(
        feature = "config",
        arg(long = "ocr-fixture-prefix", env = "OCR_FIXTURE_PREFIX", default_value = "ocr")
    )]
    pub fixture_prefix: String,

    /// Public base URL used to build read links when the backend cannot presign.
    #[cfg_attr(feature = "config", arg(long = "storage-public-url", env = "STORAGE_PUBLIC_URL"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::Fs,
            root: "./data".to_owned(),
            bucket: None,
            credential_path: None,
            fixture_prefix: "ocr".to_owned(),
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// Creates an in-memory configuration.
    pub fn memory() -> Self {
        Self {
            backend: BackendType::Memory,
            root: "/".to_owned(),
            ..Self::default()
        }
    }

    /// Creates a local filesystem configuration rooted at `root`.
    pub fn fs(root: impl Into<String>) -> Self {
        Self {
            backend: BackendType::Fs,
            root: root.into(),
            ..Self::default()
        }
    }

    /// Creates a Google Cloud Storage configuration for `bucket`.
    pub fn gcs(bucket: impl Into<String>) -> Self {
        Self {
            backend: BackendType::Gcs,
            root: "/".to_owned(),
            bucket: Some(bucket.into()),
            ..Self::default()
        }
    }

    /// Sets the public base URL for unsigned read links.
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Sets the OCR result key prefix.
    pub fn with_fixture_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fixture_prefix = prefix.into();
        self
    }

    /// Sets the GCS credential file.
    pub fn with_credential_path(mut self, path: impl Into<String>) -> Self {
        self.credential_path = Some(path.into());
        self
    }

    /// Checks backend specific requirements.
    pub fn validate(&self) -> StorageResult<()> {
        if self.backend == BackendType::Gcs
            && self.bucket.as_deref().is_none_or(|b| b.trim().is_empty())
        {
            return Err(StorageError::init("GCS backend requires a bucket name"));
        }

        if self.fixture_prefix.contains("..") {
            return Err(StorageError::init("OCR fixture prefix cannot contain '..'"));
        }

        if let Some(base) = &self.public_base_url {
            url::Url::parse(base).map_err(|e| {
                StorageError::init(format!("invalid public base URL '{base}': {e}"))
            })?;
        }

        Ok(())
    }
}
