//! Failures talking to the vector index.

use docsearch_core::{Error as CoreError, ErrorKind as CoreErrorKind};
use thiserror::Error;

pub type VectorResult<T> = Result<T, VectorError>;

#[derive(Debug, Error)]
pub enum VectorError {
    /// The index host could not be resolved or reached.
    #[error("cannot reach the vector index: {0}")]
    Connection(String),

    #[error("vector index misconfigured: {0}")]
    InvalidConfig(String),

    /// The index answered with an error status.
    #[error("vector index rejected the request: {0}")]
    Backend(String),

    #[error("vector metadata is not valid JSON")]
    Serialization(#[from] serde_json::Error),
}

impl VectorError {
    pub fn connection(reason: impl ToString) -> Self {
        Self::Connection(reason.to_string())
    }

    pub fn invalid_config(reason: impl ToString) -> Self {
        Self::InvalidConfig(reason.to_string())
    }

    pub fn backend(reason: impl ToString) -> Self {
        Self::Backend(reason.to_string())
    }

    fn core_kind(&self) -> CoreErrorKind {
        match self {
            Self::InvalidConfig(_) => CoreErrorKind::Configuration,
            Self::Serialization(_) => CoreErrorKind::Serialization,
            Self::Connection(_) | Self::Backend(_) => CoreErrorKind::Provider,
        }
    }
}

impl From<VectorError> for CoreError {
    fn from(error: VectorError) -> Self {
        CoreError::new(error.core_kind())
            .with_message(error.to_string())
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_failures_are_provider_errors() {
        let error = CoreError::from(VectorError::backend("429 Too Many Requests"));
        assert_eq!(error.kind(), CoreErrorKind::Provider);
        assert!(error.to_string().contains("429"));
    }

    #[test]
    fn bad_metadata_is_a_serialization_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = CoreError::from(VectorError::from(source));
        assert_eq!(error.kind(), CoreErrorKind::Serialization);
    }
}
