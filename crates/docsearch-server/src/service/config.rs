use derive_builder::Builder;
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    /// Bucket signed URLs must point into.
    pub const BUCKET_NAME: &str = "new-bucket";

    /// Storage service domain signed URLs must point at.
    pub const STORAGE_DOMAIN: &str = crate::service::DEFAULT_STORAGE_DOMAIN;

    /// Records per vector index upsert call.
    pub const EMBEDDING_CHUNK_SIZE: usize = 200;

    /// Vector index namespace holding paragraph vectors.
    pub const EMBEDDING_NAMESPACE: &str = "paragraphs";

    /// Search result cache lifetime (one day).
    pub const CACHE_TTL_SECONDS: u64 = 86_400;

    /// Matches returned per search.
    pub const SEARCH_TOP_K: u32 = 5;

    /// Files accepted per upload request.
    pub const MAX_FILE_UPLOAD_COUNT: usize = 5;

    /// Bytes accepted per uploaded file.
    pub const MAX_FILE_BYTES_SIZE: u64 = 25_000_000;

    /// Lifetime of presigned read URLs.
    pub const STORAGE_EXPIRE_MINUTES: u64 = 15;

    /// Lifetime of issued access tokens.
    pub const TOKEN_EXPIRE_MINUTES: u64 = 60;

    /// OCR requests allowed per client and minute.
    pub const OCR_RATE_PER_MINUTE: u32 = 5;

    /// OCR requests allowed per client and hour.
    pub const OCR_RATE_PER_HOUR: u32 = 10;
}

/// Longest validity a presigned read URL may have (seven days).
const MAX_STORAGE_EXPIRE_MINUTES: u64 = 7 * 24 * 60;

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Bucket signed URLs must point into.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "BUCKET_NAME", default_value = defaults::BUCKET_NAME)
    )]
    #[builder(default = "defaults::BUCKET_NAME.to_owned()")]
    pub bucket_name: String,

    /// Domain the host of every signed URL must end with.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORAGE_DOMAIN", default_value = defaults::STORAGE_DOMAIN)
    )]
    #[builder(default = "defaults::STORAGE_DOMAIN.to_owned()")]
    pub storage_domain: String,

    /// Records per vector index upsert call.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EMBEDDING_CHUNK_SIZE", default_value_t = defaults::EMBEDDING_CHUNK_SIZE)
    )]
    #[builder(default = "defaults::EMBEDDING_CHUNK_SIZE")]
    pub embedding_chunk_size: usize,

    /// Vector index namespace for paragraph vectors.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "EMBEDDING_NAMESPACE", default_value = defaults::EMBEDDING_NAMESPACE)
    )]
    #[builder(default = "defaults::EMBEDDING_NAMESPACE.to_owned()")]
    pub embedding_namespace: String,

    /// Lifetime of cached search results in seconds.
    #[cfg_attr(
        feature = "config",
        arg(
            long,
            env = "CACHE_TTL_SECONDS",
            alias = "redis-cache-exp",
            default_value_t = defaults::CACHE_TTL_SECONDS
        )
    )]
    #[builder(default = "defaults::CACHE_TTL_SECONDS")]
    pub cache_ttl_seconds: u64,

    /// Matches returned per search.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "SEARCH_TOP_K", default_value_t = defaults::SEARCH_TOP_K)
    )]
    #[builder(default = "defaults::SEARCH_TOP_K")]
    pub search_top_k: u32,

    /// Files accepted per upload request.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_FILE_UPLOAD_COUNT", default_value_t = defaults::MAX_FILE_UPLOAD_COUNT)
    )]
    #[builder(default = "defaults::MAX_FILE_UPLOAD_COUNT")]
    pub max_file_upload_count: usize,

    /// Bytes accepted per uploaded file.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_FILE_BYTES_SIZE", default_value_t = defaults::MAX_FILE_BYTES_SIZE)
    )]
    #[builder(default = "defaults::MAX_FILE_BYTES_SIZE")]
    pub max_file_bytes_size: u64,

    /// Lifetime of presigned read URLs in minutes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORAGE_EXPIRE_MINUTES", default_value_t = defaults::STORAGE_EXPIRE_MINUTES)
    )]
    #[builder(default = "defaults::STORAGE_EXPIRE_MINUTES")]
    pub storage_expire_minutes: u64,

    /// Lifetime of access tokens in minutes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "TOKEN_EXPIRE_MINUTES", default_value_t = defaults::TOKEN_EXPIRE_MINUTES)
    )]
    #[builder(default = "defaults::TOKEN_EXPIRE_MINUTES")]
    pub token_expire_minutes: u64,

    /// Secret used to sign access tokens.
    #[cfg_attr(feature = "config", arg(long, env = "JWT_SECRET_KEY", hide_env_values = true))]
    #[serde(skip_serializing, default)]
    pub jwt_secret_key: String,

    /// OCR requests allowed per client and minute.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OCR_RATE_PER_MINUTE", default_value_t = defaults::OCR_RATE_PER_MINUTE)
    )]
    #[builder(default = "defaults::OCR_RATE_PER_MINUTE")]
    pub ocr_rate_per_minute: u32,

    /// OCR requests allowed per client and hour.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "OCR_RATE_PER_HOUR", default_value_t = defaults::OCR_RATE_PER_HOUR)
    )]
    #[builder(default = "defaults::OCR_RATE_PER_HOUR")]
    pub ocr_rate_per_hour: u32,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Validates every field.
    pub fn validate(&self) -> Result<()> {
        checks::non_empty("Bucket name", &self.bucket_name)
            .and_then(|()| checks::non_empty("Storage domain", &self.storage_domain))
            .and_then(|()| checks::non_empty("Embedding namespace", &self.embedding_namespace))
            .and_then(|()| checks::non_empty("JWT secret key", &self.jwt_secret_key))
            .and_then(|()| checks::positive("Embedding chunk size", self.embedding_chunk_size))
            .and_then(|()| checks::positive("Search top k", self.search_top_k))
            .and_then(|()| checks::positive("Max file upload count", self.max_file_upload_count))
            .and_then(|()| checks::positive("Max file size", self.max_file_bytes_size))
            .and_then(|()| checks::positive("Token expiry", self.token_expire_minutes))
            .and_then(|()| checks::positive("OCR rate per minute", self.ocr_rate_per_minute))
            .and_then(|()| checks::positive("OCR rate per hour", self.ocr_rate_per_hour))
            .and_then(|()| checks::storage_expiry(self.storage_expire_minutes))
            .map_err(Error::config)
    }
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        match &builder.jwt_secret_key {
            Some(secret) => checks::non_empty("JWT secret key", secret)?,
            None => return Err("JWT secret key must be set".to_owned()),
        }

        if let Some(bucket) = &builder.bucket_name {
            checks::non_empty("Bucket name", bucket)?;
        }

        if let Some(domain) = &builder.storage_domain {
            checks::non_empty("Storage domain", domain)?;
        }

        if let Some(namespace) = &builder.embedding_namespace {
            checks::non_empty("Embedding namespace", namespace)?;
        }

        if let Some(chunk_size) = builder.embedding_chunk_size {
            checks::positive("Embedding chunk size", chunk_size)?;
        }

        if let Some(top_k) = builder.search_top_k {
            checks::positive("Search top k", top_k)?;
        }

        if let Some(count) = builder.max_file_upload_count {
            checks::positive("Max file upload count", count)?;
        }

        if let Some(bytes) = builder.max_file_bytes_size {
            checks::positive("Max file size", bytes)?;
        }

        if let Some(minutes) = builder.token_expire_minutes {
            checks::positive("Token expiry", minutes)?;
        }

        if let Some(rate) = builder.ocr_rate_per_minute {
            checks::positive("OCR rate per minute", rate)?;
        }

        if let Some(rate) = builder.ocr_rate_per_hour {
            checks::positive("OCR rate per hour", rate)?;
        }

        if let Some(minutes) = builder.storage_expire_minutes {
            checks::storage_expiry(minutes)?;
        }

        Ok(())
    }
}

mod checks {
    use super::MAX_STORAGE_EXPIRE_MINUTES;

    pub fn non_empty(name: &str, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err(format!("{name} cannot be empty"));
        }
        Ok(())
    }

    pub fn positive<T: Default + PartialEq>(name: &str, value: T) -> Result<(), String> {
        if value == T::default() {
            return Err(format!("{name} must be greater than 0"));
        }
        Ok(())
    }

    pub fn storage_expiry(minutes: u64) -> Result<(), String> {
        if minutes == 0 || minutes > MAX_STORAGE_EXPIRE_MINUTES {
            return Err(format!(
                "Storage expiry must be between 1 and {MAX_STORAGE_EXPIRE_MINUTES} minutes"
            ));
        }
        Ok(())
    }
}
