//! Pinecone configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{VectorError, VectorResult};

/// Pinecone connection configuration.
///
/// Either the data-plane `host` or the `index` name must be set. When only
/// the name is given, the host is resolved through the control plane.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct PineconeConfig {
    /// Pinecone API key.
    #[cfg_attr(
        feature = "config",
        arg(id = "pinecone_api_key", long = "pinecone-api-key", env = "PINECONE_API_KEY")
    )]
    pub api_key: String,

    /// Data-plane host of the index.
    #[cfg_attr(
        feature = "config",
        arg(id = "pinecone_host", long = "pinecone-host", env = "PINECONE_HOST")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Index name, resolved to a host when `host` is not set.
    #[cfg_attr(
        feature = "config",
        arg(id = "pinecone_index", long = "pinecone-index", env = "PINECONE_INDEX")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl PineconeConfig {
    /// Creates a configuration pointing at a known index host.
    pub fn new(api_key: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host: Some(host.into()),
            index: None,
        }
    }

    /// Creates a configuration that resolves the host from an index name.
    pub fn with_index_name(api_key: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            host: None,
            index: Some(index.into()),
        }
    }

    /// Checks that credentials and a target index are present.
    pub fn validate(&self) -> VectorResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(VectorError::invalid_config("Pinecone API key cannot be empty"));
        }

        let has_host = self.host.as_deref().is_some_and(|h| !h.trim().is_empty());
        let has_index = self.index.as_deref().is_some_and(|i| !i.trim().is_empty());
        if !has_host && !has_index {
            return Err(VectorError::invalid_config(
                "Either a Pinecone index host or an index name is required",
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("index", &self.index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_config_is_valid() {
        let config = PineconeConfig::new("pk-123", "paragraphs-abc.svc.pinecone.io");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn index_name_config_is_valid() {
        let config = PineconeConfig::with_index_name("pk-123", "paragraphs");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_target_is_rejected() {
        let config = PineconeConfig {
            api_key: "pk-123".into(),
            host: Some("  ".into()),
            index: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(PineconeConfig::new("", "host").validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", PineconeConfig::new("pk-secret", "host"));
        assert!(!rendered.contains("pk-secret"));
    }
}
