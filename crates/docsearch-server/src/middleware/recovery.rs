//! Request deadline and panic recovery.

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use futures::future::{self, FutureExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::{Error, ErrorKind};
use crate::{TRACING_TARGET_RECOVERY_ERROR, TRACING_TARGET_RECOVERY_PANIC};

type Panic = Box<dyn Any + Send + 'static>;

/// Per request deadline enforced in front of every handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds before a request is abandoned with 504 Gateway Timeout.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30)
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self::with_timeout_secs(30)
    }
}

impl RecoveryConfig {
    pub const fn with_timeout_secs(request_timeout: u64) -> Self {
        Self { request_timeout }
    }

    #[inline]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Turns timeouts, panics and middleware failures into [`Error`] bodies.
pub trait RouterRecoveryExt<S> {
    fn with_recovery(self, config: &RecoveryConfig) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        self.layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|error: tower::BoxError| {
                    future::ready(middleware_error(error).into_response()).boxed()
                }))
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(TimeoutLayer::new(config.request_timeout())),
        )
    }
}

fn middleware_error(error: tower::BoxError) -> Error<'static> {
    if error.is::<Elapsed>() {
        tracing::warn!(target: TRACING_TARGET_RECOVERY_ERROR, "Request deadline exceeded");
        return ErrorKind::GatewayTimeout
            .into_error()
            .with_context("request exceeded the configured timeout");
    }

    tracing::error!(
        target: TRACING_TARGET_RECOVERY_ERROR,
        error = %error,
        "Middleware failed"
    );
    ErrorKind::InternalServerError
        .into_error()
        .with_message("An unexpected error occurred")
        .with_context(error.to_string())
}

/// Best effort text of a panic payload.
fn panic_text(payload: &Panic) -> &str {
    if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else if let Some(text) = payload.downcast_ref::<&'static str>() {
        *text
    } else {
        "non-string panic payload"
    }
}

fn panic_response(payload: Panic) -> Response {
    tracing::error!(
        target: TRACING_TARGET_RECOVERY_PANIC,
        panic = panic_text(&payload),
        "Handler panicked"
    );

    ErrorKind::InternalServerError
        .into_error()
        .with_message("An unexpected panic occurred")
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "done"
    }

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn timeout_is_gateway_timeout() -> anyhow::Result<()> {
        let router = Router::new()
            .route("/slow", get(slow))
            .with_recovery(&RecoveryConfig::with_timeout_secs(1));
        let server = TestServer::new(router)?;

        let response = server.get("/slow").await;
        response.assert_status(axum::http::StatusCode::GATEWAY_TIMEOUT);
        Ok(())
    }

    #[tokio::test]
    async fn panic_is_internal_error() -> anyhow::Result<()> {
        let router = Router::new()
            .route("/boom", get(boom))
            .with_recovery(&RecoveryConfig::default());
        let server = TestServer::new(router)?;

        let response = server.get("/boom").await;
        response.assert_status_internal_server_error();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "An unexpected panic occurred");
        Ok(())
    }
}
