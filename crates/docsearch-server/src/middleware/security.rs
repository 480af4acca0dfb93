//! Security middleware for HTTP request protection.
//!
//! CORS, security response headers, response compression and request body
//! size limits. Body limits are sized from the upload policy so that a full
//! upload batch is never cut off by the transport.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderName, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::service::ServiceConfig;

/// Headroom for multipart framing and the non-file parts of a request.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Returns a body limit large enough for a full upload batch.
pub fn upload_body_limit(config: &ServiceConfig) -> usize {
    let per_file = usize::try_from(config.max_file_bytes_size).unwrap_or(usize::MAX);
    per_file
        .saturating_mul(config.max_file_upload_count)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
}

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Layers CORS, security headers, compression and a body limit of
    /// `max_body_bytes`.
    fn with_security(
        self,
        cors: &CorsConfig,
        headers: &SecurityHeadersConfig,
        max_body_bytes: usize,
    ) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(
        self,
        cors: &CorsConfig,
        headers: &SecurityHeadersConfig,
        max_body_bytes: usize,
    ) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.to_header_values())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers([header::RETRY_AFTER])
            .allow_credentials(cors.allow_credentials)
            .max_age(cors.max_age());

        let router = self
            .layer(DefaultBodyLimit::max(max_body_bytes))
            .layer(RequestBodyLimitLayer::new(max_body_bytes))
            .layer(CompressionLayer::new())
            .layer(cors_layer);

        headers
            .response_headers()
            .into_iter()
            .fold(router, |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::overriding(name, value))
            })
    }
}

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    ///
    /// If empty, defaults to localhost origins for development.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value = "3600")
    )]
    pub max_age_seconds: u64,

    /// Whether to allow credentials in CORS requests.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value = "true", action = clap::ArgAction::Set)
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    #[inline]
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Converts configured origins to header values, falling back to
    /// localhost origins for development. Unparsable origins are dropped.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        if self.allowed_origins.is_empty() {
            return vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://localhost:5173"),
            ];
        }

        self.allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect()
    }
}

/// Hardening headers set on every response.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "config does nothing unless you use it"]
pub struct SecurityHeadersConfig {
    pub hsts_max_age_seconds: u64,
    pub hsts_include_subdomains: bool,
    /// `X-Frame-Options`; the API is never meant to be framed.
    pub frame_options: &'static str,
    pub referrer_policy: &'static str,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            hsts_max_age_seconds: 365 * 24 * 60 * 60,
            hsts_include_subdomains: true,
            frame_options: "DENY",
            referrer_policy: "strict-origin-when-cross-origin",
        }
    }
}

impl SecurityHeadersConfig {
    pub fn hsts(&self) -> String {
        let subdomains = if self.hsts_include_subdomains {
            "; includeSubDomains"
        } else {
            ""
        };
        format!("max-age={}{subdomains}", self.hsts_max_age_seconds)
    }

    fn response_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = vec![
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (header::X_FRAME_OPTIONS, HeaderValue::from_static(self.frame_options)),
            (header::REFERRER_POLICY, HeaderValue::from_static(self.referrer_policy)),
        ];
        if let Ok(hsts) = HeaderValue::try_from(self.hsts()) {
            headers.push((header::STRICT_TRANSPORT_SECURITY, hsts));
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::post;
    use axum_test::TestServer;

    use super::*;

    fn config() -> anyhow::Result<ServiceConfig> {
        Ok(ServiceConfig::builder()
            .with_jwt_secret_key("secret")
            .with_max_file_upload_count(2_usize)
            .with_max_file_bytes_size(1000_u64)
            .build()?)
    }

    #[test]
    fn body_limit_covers_a_full_batch() -> anyhow::Result<()> {
        assert_eq!(upload_body_limit(&config()?), 2000 + MULTIPART_OVERHEAD_BYTES);
        Ok(())
    }

    #[test]
    fn invalid_origins_are_dropped() {
        let cors = CorsConfig {
            allowed_origins: vec!["https://app.example.com".to_owned(), "bad\norigin".to_owned()],
            ..CorsConfig::default()
        };
        assert_eq!(cors.to_header_values().len(), 1);
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() -> anyhow::Result<()> {
        let router = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .with_security(&CorsConfig::default(), &SecurityHeadersConfig::default(), 16);
        let server = TestServer::new(router)?;

        let response = server.post("/echo").text("x".repeat(64)).await;
        response.assert_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE);

        let response = server.post("/echo").text("small").await;
        response.assert_status_ok();
        assert_eq!(response.header("x-content-type-options"), "nosniff");
        assert_eq!(response.header("x-frame-options"), "DENY");
        assert_eq!(
            response.header("strict-transport-security"),
            "max-age=31536000; includeSubDomains"
        );
        Ok(())
    }
}
