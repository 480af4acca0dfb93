//! Embedding failures.

use std::fmt::Display;

use docsearch_core::{Error as CoreError, ErrorKind as CoreErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The embedding API call failed, e.g. on auth, quota or transport.
    #[error("{provider} request failed: {message}")]
    Provider { provider: String, message: String },

    /// The provider answered, but not with one vector per input.
    #[error("unusable embedding response: {0}")]
    Embedding(String),

    #[error("embedder misconfigured: {0}")]
    Config(String),
}

impl Error {
    pub fn provider(provider: impl Display, message: impl Display) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.to_string(),
        }
    }

    pub fn embedding(message: impl Display) -> Self {
        Self::Embedding(message.to_string())
    }

    pub fn config(message: impl Display) -> Self {
        Self::Config(message.to_string())
    }
}

impl From<Error> for CoreError {
    fn from(error: Error) -> Self {
        let kind = if matches!(error, Error::Config(_)) {
            CoreErrorKind::Configuration
        } else {
            CoreErrorKind::Provider
        };
        CoreError::new(kind)
            .with_message(error.to_string())
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failures_keep_the_provider_name() {
        let error = CoreError::from(Error::provider("openai", "401 Unauthorized"));
        assert_eq!(error.kind(), CoreErrorKind::Provider);
        assert!(error.to_string().contains("openai request failed"));
    }

    #[test]
    fn config_errors_map_to_configuration() {
        let error = CoreError::from(Error::config("dimensions out of range"));
        assert_eq!(error.kind(), CoreErrorKind::Configuration);
    }
}
