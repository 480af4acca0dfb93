//! Failures of the NATS backed stores.

use std::time::Duration;

use docsearch_core::{Error as CoreError, ErrorKind as CoreErrorKind};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot reach NATS: {0}")]
    Connection(#[from] async_nats::Error),

    /// A stored value is not the JSON the store expects.
    #[error("KV value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no answer from NATS within {0:?}")]
    Timeout(Duration),

    /// A create-only write found the key already taken.
    #[error("key '{key}' already exists in bucket '{bucket}'")]
    KvKeyExists { bucket: String, key: String },

    #[error("NATS misconfigured: {0}")]
    InvalidConfig(String),

    /// A JetStream call failed; `operation` names the call.
    #[error("{operation} failed: {details}")]
    Operation { operation: String, details: String },
}

impl Error {
    pub fn operation(operation: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            details: details.into(),
        }
    }

    pub fn kv_key_exists(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::KvKeyExists {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    #[inline]
    pub fn timeout(after: Duration) -> Self {
        Self::Timeout(after)
    }
}

impl From<Error> for CoreError {
    fn from(error: Error) -> Self {
        let kind = match &error {
            Error::KvKeyExists { .. } => CoreErrorKind::Conflict,
            Error::Timeout(_) => CoreErrorKind::Timeout,
            Error::Serialization(_) => CoreErrorKind::Serialization,
            Error::InvalidConfig(_) => CoreErrorKind::Configuration,
            Error::Connection(_) | Error::Operation { .. } => CoreErrorKind::Provider,
        };
        CoreError::new(kind)
            .with_message(error.to_string())
            .with_source(error)
    }
}
