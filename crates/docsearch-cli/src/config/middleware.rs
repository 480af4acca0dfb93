//! Middleware configuration for the HTTP server.
//!
//! CORS, OpenAPI and recovery configs are re-exported from `docsearch-server`
//! and support both CLI arguments and environment variables.
//!
//! # Example
//!
//! ```bash
//! docsearch --allowed-origins "https://example.com" --request-timeout 60
//! ```

use axum_client_ip::ClientIpSource;
use clap::{Args, ValueEnum};
use docsearch_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig, upload_body_limit};
use docsearch_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Where the client address used for rate limiting comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClientIpHeader {
    /// Peer address of the TCP connection.
    #[default]
    ConnectInfo,
    /// Rightmost `X-Forwarded-For` entry.
    RightmostXForwardedFor,
    /// `X-Real-Ip` header.
    XRealIp,
    /// `CF-Connecting-IP` header.
    CfConnectingIp,
}

impl From<ClientIpHeader> for ClientIpSource {
    fn from(header: ClientIpHeader) -> Self {
        match header {
            ClientIpHeader::ConnectInfo => Self::ConnectInfo,
            ClientIpHeader::RightmostXForwardedFor => Self::RightmostXForwardedFor,
            ClientIpHeader::XRealIp => Self::XRealIp,
            ClientIpHeader::CfConnectingIp => Self::CfConnectingIp,
        }
    }
}

/// Middleware configuration combining CORS, OpenAPI, recovery and client
/// identification settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Paths of the OpenAPI document and the Scalar UI.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,

    /// Request body limit in bytes.
    ///
    /// Defaults to a full upload batch plus multipart overhead.
    #[arg(long, env = "MAX_BODY_BYTES")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<usize>,

    /// Source of the client address used by the OCR rate limiter.
    #[arg(
        long,
        env = "CLIENT_IP_SOURCE",
        value_enum,
        default_value_t = ClientIpHeader::ConnectInfo
    )]
    #[serde(default)]
    pub client_ip_source: ClientIpHeader,
}

impl MiddlewareConfig {
    /// Returns the configured body limit or the one derived from the upload policy.
    pub fn body_limit(&self, service: &ServiceConfig) -> usize {
        self.max_body_bytes
            .unwrap_or_else(|| upload_body_limit(service))
    }

    #[inline]
    pub fn client_ip_source(&self) -> ClientIpSource {
        self.client_ip_source.into()
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            "OpenAPI configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            max_body_bytes = ?self.max_body_bytes,
            client_ip_source = ?self.client_ip_source,
            "Request handling configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn middleware(max_body_bytes: Option<usize>) -> MiddlewareConfig {
        MiddlewareConfig {
            cors: CorsConfig::default(),
            openapi: OpenApiConfig::default(),
            recovery: RecoveryConfig::default(),
            max_body_bytes,
            client_ip_source: ClientIpHeader::default(),
        }
    }

    #[test]
    fn body_limit_defaults_to_upload_policy() -> anyhow::Result<()> {
        let service = ServiceConfig::builder()
            .with_jwt_secret_key("secret")
            .with_max_file_upload_count(2_usize)
            .with_max_file_bytes_size(1_000_u64)
            .build()?;

        assert_eq!(
            middleware(None).body_limit(&service),
            upload_body_limit(&service)
        );
        assert_eq!(middleware(Some(4096)).body_limit(&service), 4096);
        Ok(())
    }

    #[test]
    fn client_ip_source_defaults_to_connect_info() {
        assert!(matches!(
            middleware(None).client_ip_source(),
            ClientIpSource::ConnectInfo
        ));
    }
}
